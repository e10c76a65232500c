use smallvec::SmallVec;

/// Linear board dimension, used for row/column coordinates
pub type Coord = u16;

/// Area dimension, used for mine/cell counts
pub type CellCount = u32;

/// Shorthand for a (row, column) pair
pub type Coord2 = (Coord, Coord);

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount) * (b as CellCount)
}

/// The 8 relative offsets around a cell, excluding (0, 0)
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds neighbors of `coords` on a board of the given size
pub fn neighbors((row, col): Coord2, (rows, cols): Coord2) -> SmallVec<[Coord2; 8]> {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| {
            let nr = row as i32 + dr;
            let nc = col as i32 + dc;
            if nr >= 0 && nc >= 0 && nr < rows as i32 && nc < cols as i32 {
                Some((nr as Coord, nc as Coord))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_three_neighbors() {
        let got = neighbors((0, 0), (8, 8));
        assert_eq!(got.as_slice(), &[(0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn center_has_eight_neighbors() {
        assert_eq!(neighbors((3, 3), (8, 8)).len(), 8);
    }

    #[test]
    fn edge_has_five_neighbors() {
        assert_eq!(neighbors((0, 3), (8, 8)).len(), 5);
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert!(neighbors((0, 0), (1, 1)).is_empty());
    }
}
