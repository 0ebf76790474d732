// Fixed-size grid model: placement and targeting primitives.
//
// `Board` owns a height x width matrix of `Cell` and enforces the cell
// transition invariant: `Empty -> Ship` via `place`, `Ship -> Hit` and
// `Empty -> Miss` via `fire_at`. Nothing here knows about seats, turns, or
// phases — that is `session.rs`'s job.

use broadside_protocol::types::{BoardGrid, Cell};

/// Outcome of firing at a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotOutcome {
    /// The cell was already `Hit` or `Miss`; nothing changed.
    AlreadyTargeted,
    Hit,
    Miss,
}

/// One player's board.
#[derive(Clone, Debug)]
pub struct Board {
    height: u8,
    width: u8,
    cells: BoardGrid,
}

impl Board {
    /// Create an all-`Empty` board.
    pub fn new(height: u8, width: u8) -> Self {
        Self {
            height,
            width,
            cells: vec![vec![Cell::Empty; usize::from(width)]; usize::from(height)],
        }
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// True iff `(row, col)` names a cell on this board.
    pub fn in_bounds(&self, row: u8, col: u8) -> bool {
        row < self.height && col < self.width
    }

    /// True iff a ship of `length` starting at `(row, col)` and extending
    /// along the given axis lies fully within bounds over only `Empty`
    /// cells. No side effects.
    pub fn can_place(&self, row: u8, col: u8, length: u8, horizontal: bool) -> bool {
        if !self.in_bounds(row, col) {
            return false;
        }
        let (end_row, end_col) = if horizontal {
            (u16::from(row), u16::from(col) + u16::from(length))
        } else {
            (u16::from(row) + u16::from(length), u16::from(col))
        };
        if horizontal {
            if end_col > u16::from(self.width) {
                return false;
            }
        } else if end_row > u16::from(self.height) {
            return false;
        }
        self.run(row, col, length, horizontal)
            .all(|(r, c)| self.cells[r][c] == Cell::Empty)
    }

    /// Set every cell of the run to `Ship`. Returns false (mutating
    /// nothing) if the run fails `can_place`.
    pub fn place(&mut self, row: u8, col: u8, length: u8, horizontal: bool) -> bool {
        if !self.can_place(row, col, length, horizontal) {
            return false;
        }
        let targets: Vec<(usize, usize)> = self.run(row, col, length, horizontal).collect();
        for (r, c) in targets {
            self.cells[r][c] = Cell::Ship;
        }
        true
    }

    /// Resolve a shot at `(row, col)`. Caller must bounds-check first.
    pub fn fire_at(&mut self, row: u8, col: u8) -> ShotOutcome {
        let cell = &mut self.cells[usize::from(row)][usize::from(col)];
        match *cell {
            Cell::Hit | Cell::Miss => ShotOutcome::AlreadyTargeted,
            Cell::Ship => {
                *cell = Cell::Hit;
                ShotOutcome::Hit
            }
            Cell::Empty => {
                *cell = Cell::Miss;
                ShotOutcome::Miss
            }
        }
    }

    /// True iff no cell still holds an unhit `Ship`.
    pub fn all_ships_sunk(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|&c| c != Cell::Ship))
    }

    /// Copy of the full grid, for wire messages and snapshots.
    pub fn snapshot(&self) -> BoardGrid {
        self.cells.clone()
    }

    /// Cell coordinates covered by a run, clamped to the grid.
    fn run(
        &self,
        row: u8,
        col: u8,
        length: u8,
        horizontal: bool,
    ) -> impl Iterator<Item = (usize, usize)> {
        let (row, col) = (usize::from(row), usize::from(col));
        let (height, width) = (usize::from(self.height), usize::from(self.width));
        (0..usize::from(length)).filter_map(move |i| {
            let (r, c) = if horizontal { (row, col + i) } else { (row + i, col) };
            (r < height && c < width).then_some((r, c))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(7, 9)
    }

    #[test]
    fn place_horizontal_requires_col_plus_len_within_width() {
        let b = board();
        assert!(b.can_place(0, 4, 5, true)); // 4 + 5 == 9, touches the edge
        assert!(!b.can_place(0, 5, 5, true)); // 5 + 5 > 9
    }

    #[test]
    fn place_vertical_requires_row_plus_len_within_height() {
        let b = board();
        assert!(b.can_place(2, 0, 5, false)); // 2 + 5 == 7
        assert!(!b.can_place(3, 0, 5, false)); // 3 + 5 > 7
    }

    #[test]
    fn can_place_rejects_out_of_grid_origin() {
        let b = board();
        assert!(!b.can_place(7, 0, 2, true));
        assert!(!b.can_place(0, 9, 2, false));
    }

    #[test]
    fn can_place_rejects_overlap() {
        let mut b = board();
        assert!(b.place(3, 2, 4, true));
        // Crosses the existing ship.
        assert!(!b.can_place(1, 4, 4, false));
        // Parallel and adjacent is fine.
        assert!(b.can_place(4, 2, 4, true));
    }

    #[test]
    fn rejected_placement_mutates_nothing() {
        let mut b = board();
        assert!(!b.place(0, 7, 5, true));
        assert_eq!(b.snapshot(), broadside_protocol::empty_grid(7, 9));
    }

    #[test]
    fn placement_only_touches_the_run() {
        let mut b = board();
        assert!(b.place(2, 1, 3, true));
        let grid = b.snapshot();
        for (r, row) in grid.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                let on_run = r == 2 && (1..4).contains(&c);
                let expected = if on_run { Cell::Ship } else { Cell::Empty };
                assert_eq!(cell, expected, "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn fire_at_transitions() {
        let mut b = board();
        b.place(0, 0, 2, true);
        assert_eq!(b.fire_at(0, 0), ShotOutcome::Hit);
        assert_eq!(b.fire_at(3, 3), ShotOutcome::Miss);
    }

    #[test]
    fn second_shot_at_same_cell_is_already_targeted() {
        let mut b = board();
        b.place(0, 0, 2, true);
        assert_eq!(b.fire_at(0, 0), ShotOutcome::Hit);
        assert_eq!(b.fire_at(0, 0), ShotOutcome::AlreadyTargeted);
        // The cell keeps the first shot's outcome.
        assert_eq!(b.snapshot()[0][0], Cell::Hit);

        assert_eq!(b.fire_at(5, 5), ShotOutcome::Miss);
        assert_eq!(b.fire_at(5, 5), ShotOutcome::AlreadyTargeted);
        assert_eq!(b.snapshot()[5][5], Cell::Miss);
    }

    #[test]
    fn all_ships_sunk_iff_every_ship_cell_hit() {
        let mut b = board();
        b.place(0, 0, 2, true);
        assert!(!b.all_ships_sunk());
        b.fire_at(0, 0);
        assert!(!b.all_ships_sunk());
        b.fire_at(0, 1);
        assert!(b.all_ships_sunk());
    }

    #[test]
    fn empty_board_counts_as_sunk() {
        assert!(board().all_ships_sunk());
    }
}
