use serde::{Deserialize, Serialize};

pub use cache::*;
pub use error::*;
pub use gate::*;
pub use history::*;
pub use snapshot::*;
pub use types::*;

mod cache;
mod error;
mod gate;
mod history;
mod snapshot;
mod types;

/// Named board preset, or a custom user-edited triple
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameLevel {
    pub name: String,
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl GameLevel {
    pub fn new(name: impl Into<String>, rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
            mines,
        }
    }

    pub fn easy() -> Self {
        Self::new("Easy", 8, 8, 10)
    }

    pub fn medium() -> Self {
        Self::new("Medium", 12, 12, 20)
    }

    pub fn hard() -> Self {
        Self::new("Hard", 16, 16, 40)
    }

    pub fn custom(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self::new("Custom", rows, cols, mines)
    }

    pub fn presets() -> Vec<GameLevel> {
        vec![Self::easy(), Self::medium(), Self::hard()]
    }

    /// Enforced before a new game is requested from the server
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines >= mult(self.rows, self.cols) {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub fn size_label(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }
}
