use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{mult, neighbors, CellCount, Coord, Coord2, GameError, Result};

/// One cell of the server-owned board, as reported in a snapshot.
///
/// `mine` is present in the wire format but never inspected for display
/// decisions; client logic only uses it to exclude mines from auto-reveal
/// requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: Coord,
    pub column: Coord,
    pub mine: bool,
    pub flagged: bool,
    pub adjacent_mines: u8,
    pub revealed: bool,
}

impl Cell {
    pub fn coords(&self) -> Coord2 {
        (self.row, self.column)
    }
}

/// Full board state as returned by the server.
///
/// Every response carries a complete snapshot; the client treats it as
/// authoritative and never merges individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub rows: Coord,
    pub cols: Coord,
    pub total_mines: CellCount,
    pub game_over: bool,
    pub won: bool,
    pub cells: Vec<Cell>,
}

impl BoardSnapshot {
    pub fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub fn in_bounds(&self, (row, col): Coord2) -> bool {
        row < self.rows && col < self.cols
    }

    /// Server responses are untrusted input; checked once at the transport
    /// boundary before they replace the cache.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.cells.len() != self.total_cells() as usize {
            return Err(GameError::BadSnapshot(format!(
                "expected {} cells, got {}",
                self.total_cells(),
                self.cells.len()
            )));
        }
        if self.game_over && self.won {
            return Err(GameError::BadSnapshot(
                "gameOver and won are both set".into(),
            ));
        }
        Ok(())
    }

    /// Cell lookup by (row, column); the wire format does not promise any
    /// particular cell ordering
    pub fn cell_at(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.coords() == coords)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.flagged).count() as CellCount
    }

    /// How many mines have not been flagged yet; goes negative when the
    /// player over-flags
    pub fn mines_left(&self) -> i64 {
        self.total_mines as i64 - self.flagged_count() as i64
    }

    /// Win condition: no cell is simultaneously unrevealed and safe.
    /// Flags play no part.
    pub fn is_cleared(&self) -> bool {
        !self.cells.iter().any(|cell| !cell.revealed && !cell.mine)
    }

    pub fn neighbors_of(&self, coords: Coord2) -> SmallVec<[Coord2; 8]> {
        neighbors(coords, self.size())
    }
}
