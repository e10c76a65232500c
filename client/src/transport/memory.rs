use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use varredor_core::{neighbors, BoardSnapshot, Cell, CellCount, Coord, Coord2};

use super::{BoardTransport, GameId, TransportError, TransportResult};

/// In-process stand-in for the remote game service, used by tests.
///
/// Mine positions are injected explicitly so a test controls the board
/// exactly; there is no placement algorithm. Each reveal call uncovers a
/// single cell and never cascades: flood-fill expansion is the client's
/// job, which is the server contract this crate is written against. The
/// fake also never sets the `won` flag, so local win detection is
/// exercised the same way it is against the real service.
#[derive(Default)]
pub struct MemoryTransport {
    games: Mutex<HashMap<GameId, BoardSnapshot>>,
    staged_mines: Mutex<Vec<Coord2>>,
    reveal_log: Mutex<Vec<Coord2>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mine coordinates for the next `create_game` call.
    ///
    /// The staged layout is authoritative: `create_game` ignores its mine
    /// count argument and the created board's `total_mines` always reflects
    /// the layout, staged or empty.
    pub async fn stage_mines(&self, mines: &[Coord2]) {
        *self.staged_mines.lock().await = mines.to_vec();
    }

    /// Make every subsequent request fail, as an unreachable service would
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Every reveal request seen so far, in arrival order
    pub async fn reveal_log(&self) -> Vec<Coord2> {
        self.reveal_log.lock().await.clone()
    }

    pub async fn reveal_calls(&self) -> usize {
        self.reveal_log.lock().await.len()
    }

    fn check_available(&self) -> TransportResult<()> {
        if self.failing.load(Ordering::Relaxed) {
            Err(TransportError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn build_board(rows: Coord, cols: Coord, mines: &[Coord2]) -> BoardSnapshot {
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        let mut total_mines: CellCount = 0;
        for row in 0..rows {
            for col in 0..cols {
                let mine = mines.contains(&(row, col));
                if mine {
                    total_mines += 1;
                }
                let adjacent_mines = neighbors((row, col), (rows, cols))
                    .iter()
                    .filter(|pos| mines.contains(pos))
                    .count() as u8;
                cells.push(Cell {
                    row,
                    column: col,
                    mine,
                    flagged: false,
                    adjacent_mines,
                    revealed: false,
                });
            }
        }
        BoardSnapshot {
            rows,
            cols,
            total_mines,
            game_over: false,
            won: false,
            cells,
        }
    }

    async fn with_game<T>(
        &self,
        id: &str,
        apply: impl FnOnce(&mut BoardSnapshot) -> T,
    ) -> TransportResult<T> {
        let mut games = self.games.lock().await;
        let board = games
            .get_mut(id)
            .ok_or_else(|| TransportError::UnknownGame(id.to_owned()))?;
        Ok(apply(board))
    }
}

#[async_trait]
impl BoardTransport for MemoryTransport {
    async fn create_game(
        &self,
        rows: Coord,
        cols: Coord,
        _mines: CellCount,
    ) -> TransportResult<GameId> {
        self.check_available()?;
        let id = format!("g{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mines = self.staged_mines.lock().await.clone();
        let board = Self::build_board(rows, cols, &mines);
        self.games.lock().await.insert(id.clone(), board);
        Ok(id)
    }

    async fn fetch_board(&self, id: &str) -> TransportResult<BoardSnapshot> {
        self.check_available()?;
        self.with_game(id, |board| board.clone()).await
    }

    async fn reveal(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot> {
        self.check_available()?;
        self.reveal_log.lock().await.push((row, col));
        self.with_game(id, |board| {
            let game_over = board.game_over;
            if let Some(cell) = board
                .cells
                .iter_mut()
                .find(|cell| cell.coords() == (row, col))
            {
                if !game_over && !cell.revealed {
                    cell.revealed = true;
                    if cell.mine {
                        board.game_over = true;
                    }
                }
            }
            board.clone()
        })
        .await
    }

    async fn flag(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot> {
        self.check_available()?;
        self.with_game(id, |board| {
            let game_over = board.game_over;
            if let Some(cell) = board
                .cells
                .iter_mut()
                .find(|cell| cell.coords() == (row, col))
            {
                if !game_over && !cell.revealed {
                    cell.flagged = !cell.flagged;
                }
            }
            board.clone()
        })
        .await
    }
}
