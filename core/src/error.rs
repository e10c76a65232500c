use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid coordinates")]
    InvalidCoords,
    #[error("mine count must be smaller than the cell count")]
    TooManyMines,
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    #[error("game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("no board snapshot available yet")]
    NoBoard,
    #[error("malformed board snapshot: {0}")]
    BadSnapshot(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
