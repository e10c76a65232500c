use crate::{BoardSnapshot, Cell, Coord2};

/// Holds the most recent full snapshot returned by the server.
///
/// `replace` swaps the whole snapshot; fields are never merged. When
/// concurrent reveal responses resolve out of order the last one applied
/// wins, and every read between two responses sees the same copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardCache {
    snapshot: Option<BoardSnapshot>,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, snapshot: BoardSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn get(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<&Cell> {
        self.get().and_then(|snapshot| snapshot.cell_at(coords))
    }

    pub fn mines_left(&self) -> i64 {
        self.get().map_or(0, BoardSnapshot::mines_left)
    }

    pub fn is_cleared(&self) -> bool {
        self.get().is_some_and(BoardSnapshot::is_cleared)
    }

    /// The one local mutation the client performs on a snapshot: setting the
    /// won flag after local win detection, before the session is recorded.
    pub fn mark_won(&mut self) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.won = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellCount;

    fn snapshot(rows: u16, cols: u16, revealed: &[Coord2]) -> BoardSnapshot {
        let mut cells = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell {
                    row,
                    column: col,
                    mine: false,
                    flagged: false,
                    adjacent_mines: 0,
                    revealed: revealed.contains(&(row, col)),
                });
            }
        }
        BoardSnapshot {
            rows,
            cols,
            total_mines: 0 as CellCount,
            game_over: false,
            won: false,
            cells,
        }
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let mut cache = BoardCache::new();
        assert!(cache.get().is_none());
        assert!(cache.cell_at((0, 0)).is_none());

        cache.replace(snapshot(2, 2, &[(0, 0)]));
        assert!(cache.cell_at((0, 0)).is_some_and(|cell| cell.revealed));

        cache.replace(snapshot(2, 2, &[(1, 1)]));
        assert!(cache.cell_at((0, 0)).is_some_and(|cell| !cell.revealed));
        assert!(cache.cell_at((1, 1)).is_some_and(|cell| cell.revealed));
    }

    #[test]
    fn mark_won_only_touches_the_won_flag() {
        let mut cache = BoardCache::new();
        cache.mark_won();
        assert!(cache.get().is_none());

        cache.replace(snapshot(1, 1, &[(0, 0)]));
        cache.mark_won();
        let board = cache.get().unwrap();
        assert!(board.won);
        assert!(!board.game_over);
    }
}
