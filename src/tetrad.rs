use rand::Rng;

use crate::grid::{BlockColor, BlockId, BoundedGrid, Location};

// ============================================================================
// Shapes
// ============================================================================

/// The seven canonical shapes, in the classic spawn-table order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    I,
    T,
    O,
    J,
    L,
    S,
    Z,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::I,
        Shape::T,
        Shape::O,
        Shape::J,
        Shape::L,
        Shape::S,
        Shape::Z,
    ];

    /// Spawn cells as (row, column offset) pairs, anchored at the grid's
    /// middle column. The first entry is the rotation pivot.
    pub fn spawn_offsets(&self) -> [(i16, i16); 4] {
        match self {
            Shape::I => [(1, 0), (0, 0), (2, 0), (3, 0)],
            Shape::T => [(0, 0), (0, -1), (0, 1), (1, 0)],
            Shape::O => [(0, -1), (0, 0), (1, -1), (1, 0)],
            Shape::J => [(1, 0), (0, 0), (2, 0), (2, 1)],
            Shape::L => [(1, 0), (0, 0), (2, 0), (2, -1)],
            Shape::S => [(0, 0), (1, 0), (0, 1), (1, -1)],
            Shape::Z => [(0, 0), (1, 0), (0, -1), (1, 1)],
        }
    }

    pub fn color(&self) -> BlockColor {
        match self {
            Shape::I => BlockColor::Red,
            Shape::T => BlockColor::Gray,
            Shape::O => BlockColor::Cyan,
            Shape::J => BlockColor::Yellow,
            Shape::L => BlockColor::Magenta,
            Shape::S => BlockColor::Blue,
            Shape::Z => BlockColor::Green,
        }
    }

    fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Shape Provider Trait
// ============================================================================

pub trait ShapeProvider {
    fn next_shape(&mut self) -> Shape;
}

/// Uniform draw over the seven shapes.
pub struct RandomShapeProvider;

impl ShapeProvider for RandomShapeProvider {
    fn next_shape(&mut self) -> Shape {
        Shape::random()
    }
}

/// Cycles through a fixed list of shapes; used by tests that need a
/// predictable spawn order.
pub struct SequenceShapeProvider {
    shapes: Vec<Shape>,
    index: usize,
}

impl SequenceShapeProvider {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes, index: 0 }
    }
}

impl ShapeProvider for SequenceShapeProvider {
    fn next_shape(&mut self) -> Shape {
        let shape = self.shapes[self.index % self.shapes.len()];
        self.index += 1;
        shape
    }
}

// ============================================================================
// Tetrad
// ============================================================================

/// The currently falling piece: four blocks that move and rotate together.
///
/// The tetrad does not own the grid; every operation borrows it. Once the
/// piece locks, the tetrad is simply dropped and its blocks stay behind in
/// the grid as ordinary occupants.
pub struct Tetrad {
    shape: Shape,
    blocks: [BlockId; 4],
}

impl Tetrad {
    /// Spawns a tetrad of the given shape at the top-center of the grid.
    ///
    /// No legality check is made: placement overwrites, so spawning onto an
    /// occupied cell displaces the prior occupant's cell reference. Such an
    /// overlap only surfaces at the next lock's game-over scan.
    pub fn spawn(grid: &mut BoundedGrid, shape: Shape) -> Self {
        let mid_col = grid.num_cols() / 2;
        let color = shape.color();
        let blocks = shape.spawn_offsets().map(|(row, col_offset)| {
            let id = grid.create_block(color);
            grid.place(id, Location::new(row, mid_col + col_offset));
            id
        });
        Self { shape, blocks }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn blocks(&self) -> [BlockId; 4] {
        self.blocks
    }

    /// Moves the tetrad `delta_row` rows down and `delta_col` columns to the
    /// right, provided every destination cell is valid and empty. On failure
    /// the blocks are restored and the grid is left exactly as it was.
    pub fn translate(&self, grid: &mut BoundedGrid, delta_row: i16, delta_col: i16) -> bool {
        let old_locs = self.remove_blocks(grid);
        let new_locs =
            old_locs.map(|loc| Location::new(loc.row + delta_row, loc.col + delta_col));
        if !are_empty(grid, &new_locs) {
            self.add_to_locations(grid, &old_locs);
            return false;
        }
        self.add_to_locations(grid, &new_locs);
        true
    }

    /// Rotates the tetrad 90 degrees clockwise about its pivot block, with
    /// the same all-or-nothing discipline as `translate`. The square shape
    /// is rotationally symmetric and always succeeds without moving.
    pub fn rotate(&self, grid: &mut BoundedGrid) -> bool {
        if self.shape == Shape::O {
            return true;
        }

        let old_locs = self.remove_blocks(grid);
        let Location {
            row: row_piv,
            col: col_piv,
        } = old_locs[0];
        let new_locs = old_locs
            .map(|loc| Location::new(row_piv - col_piv + loc.col, row_piv + col_piv - loc.row));
        if !are_empty(grid, &new_locs) {
            self.add_to_locations(grid, &old_locs);
            return false;
        }
        self.add_to_locations(grid, &new_locs);
        true
    }

    /// Lifts all four blocks out of the grid, returning where they were.
    fn remove_blocks(&self, grid: &mut BoundedGrid) -> [Location; 4] {
        self.blocks.map(|id| grid.remove_block(id))
    }

    /// Puts the four blocks down at the given locations.
    fn add_to_locations(&self, grid: &mut BoundedGrid, locs: &[Location; 4]) {
        for (id, &loc) in self.blocks.iter().zip(locs) {
            grid.place(*id, loc);
        }
    }
}

/// True iff every location is valid and unoccupied. The tetrad's own blocks
/// are lifted out before this runs, so a piece never collides with itself.
fn are_empty(grid: &BoundedGrid, locs: &[Location; 4]) -> bool {
    locs.iter()
        .all(|&loc| grid.is_valid(loc) && grid.get(loc).is_none())
}
