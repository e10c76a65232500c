use async_trait::async_trait;
use thiserror::Error;
use varredor_core::{BoardSnapshot, CellCount, Coord};

pub use http::*;
pub use memory::*;

mod http;
mod memory;

/// Opaque session identity handed out by the server at game creation
pub type GameId = String;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unknown game id {0:?}")]
    UnknownGame(GameId),
    #[error(transparent)]
    BadSnapshot(#[from] varredor_core::GameError),
    #[error("game service unavailable")]
    Unavailable,
}

pub type TransportResult<T> = Result<T, TransportError>;

/// The four remote operations the external game service exposes.
///
/// Every mutating call returns a fresh, authoritative board snapshot; a
/// failed call leaves the session exactly as it was, so the caller may
/// simply retry by repeating the triggering action.
#[async_trait]
pub trait BoardTransport: Send + Sync {
    /// Create a game and return its id; the caller pre-validates
    /// `mines < rows * cols`
    async fn create_game(
        &self,
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    ) -> TransportResult<GameId>;

    async fn fetch_board(&self, id: &str) -> TransportResult<BoardSnapshot>;

    async fn reveal(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot>;

    async fn flag(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot>;
}
