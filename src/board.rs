use crate::grid::{BoundedGrid, Location};
use crate::tetrad::{RandomShapeProvider, ShapeProvider, Tetrad};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_ROWS: i16 = 20;
pub const GRID_COLS: i16 = 10;

// Scoring
pub const SCORE_PER_ROW: u32 = 1000;

// ============================================================================
// Types
// ============================================================================

/// One discrete input event, as delivered by the input layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    RowsCleared(u32),
    GameOver,
}

// ============================================================================
// Board
// ============================================================================

/// Owns the grid and the currently falling tetrad, and drives the piece
/// lifecycle: spawn, fall, lock, clear completed rows, detect game over,
/// spawn again.
pub struct Board {
    grid: BoundedGrid,
    tetrad: Tetrad,
    score: u32,
    rows_cleared: u32,
    provider: Box<dyn ShapeProvider>,
    events: Vec<BoardEvent>,
}

impl Board {
    pub fn new(rows: i16, cols: i16) -> Self {
        Self::with_provider(rows, cols, Box::new(RandomShapeProvider))
    }

    pub fn with_provider(rows: i16, cols: i16, mut provider: Box<dyn ShapeProvider>) -> Self {
        let mut grid = BoundedGrid::new(rows, cols);
        let tetrad = Tetrad::spawn(&mut grid, provider.next_shape());
        Self {
            grid,
            tetrad,
            score: 0,
            rows_cleared: 0,
            provider,
            events: Vec::new(),
        }
    }

    pub fn grid(&self) -> &BoundedGrid {
        &self.grid
    }

    /// Direct grid access, for tests and embedders that set up locked-block
    /// positions.
    pub fn grid_mut(&mut self) -> &mut BoundedGrid {
        &mut self.grid
    }

    pub fn tetrad(&self) -> &Tetrad {
        &self.tetrad
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rows_cleared(&self) -> u32 {
        self.rows_cleared
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Applies one input command to the falling tetrad. Returns whether the
    /// piece moved; `false` means the grid is unchanged. Locking is never
    /// triggered here, only by `tick`.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_tetrad(0, -1),
            Command::MoveRight => self.move_tetrad(0, 1),
            Command::SoftDrop => self.move_tetrad(1, 0),
            Command::HardDrop => {
                let mut moved = false;
                while self.tetrad.translate(&mut self.grid, 1, 0) {
                    moved = true;
                }
                if moved {
                    self.events.push(BoardEvent::PieceMoved);
                }
                moved
            }
            Command::Rotate => {
                let rotated = self.tetrad.rotate(&mut self.grid);
                if rotated {
                    self.events.push(BoardEvent::PieceRotated);
                }
                rotated
            }
        }
    }

    fn move_tetrad(&mut self, delta_row: i16, delta_col: i16) -> bool {
        let moved = self.tetrad.translate(&mut self.grid, delta_row, delta_col);
        if moved {
            self.events.push(BoardEvent::PieceMoved);
        }
        moved
    }

    // ------------------------------------------------------------------------
    // Gravity tick
    // ------------------------------------------------------------------------

    /// One gravity step: the tetrad falls a row, or locks where it sits.
    /// Locking runs the whole clear/game-over/respawn sequence before
    /// returning, so the board is always left with a falling piece.
    pub fn tick(&mut self) {
        if !self.move_tetrad(1, 0) {
            self.lock_and_spawn();
        }
    }

    fn lock_and_spawn(&mut self) {
        self.events.push(BoardEvent::PieceLocked);
        self.clear_completed_rows();
        if self.grid.occupied_locations().iter().any(|loc| loc.row == 0) {
            self.clear_board();
            self.score = 0;
            self.events.push(BoardEvent::GameOver);
        }
        self.tetrad = Tetrad::spawn(&mut self.grid, self.provider.next_shape());
    }

    // ------------------------------------------------------------------------
    // Row clearing
    // ------------------------------------------------------------------------

    /// True iff every cell in the row is occupied.
    pub fn is_completed_row(&self, row: i16) -> bool {
        (0..self.grid.num_cols()).all(|col| self.grid.get(Location::new(row, col)).is_some())
    }

    /// Scans rows top to bottom and clears each completed one as it is
    /// found, applying gravity right away, so rows completed by falling
    /// blocks are caught in the same pass. Scores a fixed amount per row.
    pub fn clear_completed_rows(&mut self) -> u32 {
        let mut cleared = 0;
        for row in 0..self.grid.num_rows() {
            if self.is_completed_row(row) {
                self.clear_row(row);
                self.score += SCORE_PER_ROW;
                cleared += 1;
            }
        }
        if cleared > 0 {
            self.rows_cleared += cleared;
            self.events.push(BoardEvent::RowsCleared(cleared));
        }
        cleared
    }

    /// Destroys every block in a completed row, then shifts each column's
    /// blocks above it down one row. The vacated cells make the shift
    /// destinations empty by construction, so `move_to` needs no check.
    fn clear_row(&mut self, row: i16) {
        for col in 0..self.grid.num_cols() {
            let loc = Location::new(row, col);
            let id = self
                .grid
                .get(loc)
                .expect("clear_row called on a row with a gap");
            self.grid.destroy(id);
            for r in (0..row).rev() {
                if let Some(above) = self.grid.get(Location::new(r, col)) {
                    self.grid.move_to(above, Location::new(r + 1, col));
                }
            }
        }
    }

    fn clear_board(&mut self) {
        for loc in self.grid.occupied_locations() {
            if let Some(id) = self.grid.get(loc) {
                self.grid.destroy(id);
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLS)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::grid::{BlockColor, BlockId};

    /// Places a single locked block, as if left behind by an earlier piece.
    pub fn place_block(grid: &mut BoundedGrid, loc: Location) -> BlockId {
        let id = grid.create_block(BlockColor::Gray);
        grid.place(id, loc);
        id
    }

    pub fn fill_row(grid: &mut BoundedGrid, row: i16) {
        for col in 0..grid.num_cols() {
            place_block(grid, Location::new(row, col));
        }
    }

    pub fn fill_row_with_gap(grid: &mut BoundedGrid, row: i16, gap_col: i16) {
        for col in 0..grid.num_cols() {
            if col != gap_col {
                place_block(grid, Location::new(row, col));
            }
        }
    }
}
