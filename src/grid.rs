// ============================================================================
// Locations
// ============================================================================

/// A row/column pair. Signed so candidate positions outside the grid
/// (negative rows during a rotation, for example) stay representable;
/// validity is always relative to a particular grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Location {
    pub row: i16,
    pub col: i16,
}

impl Location {
    pub fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Presentational tag carried per block for the display layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockColor {
    Red,
    Gray,
    Cyan,
    Yellow,
    Magenta,
    Blue,
    Green,
}

/// Handle into a grid's block pool. Ids are retired when a block is
/// destroyed and may be reused by later blocks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockId(u32);

struct BlockSlot {
    color: BlockColor,
    /// `Some` while the block occupies a cell, `None` while detached.
    location: Option<Location>,
}

// ============================================================================
// Grid
// ============================================================================

/// A fixed-size rectangular occupancy grid plus the pool of blocks that
/// live on it.
///
/// Cells hold block handles rather than block values, and each block record
/// carries its own location, so the two sides must stay in agreement: if a
/// block's record says `Some(loc)`, the cell at `loc` points back at it.
/// All mutation goes through `place`/`remove`/`remove_block`/`move_to`,
/// which maintain that pairing. The one sanctioned exception is `place`'s
/// unconditional overwrite: a displaced occupant keeps its stale location
/// until it is removed or destroyed (see `place`).
pub struct BoundedGrid {
    rows: i16,
    cols: i16,
    cells: Vec<Option<BlockId>>,
    slots: Vec<Option<BlockSlot>>,
    free: Vec<BlockId>,
}

impl BoundedGrid {
    pub fn new(rows: i16, cols: i16) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> i16 {
        self.rows
    }

    pub fn num_cols(&self) -> i16 {
        self.cols
    }

    pub fn is_valid(&self, loc: Location) -> bool {
        loc.row >= 0 && loc.row < self.rows && loc.col >= 0 && loc.col < self.cols
    }

    /// Panics on out-of-range locations: callers are required to pre-check
    /// with `is_valid`, and silently clamping would hide their bugs.
    fn index(&self, loc: Location) -> usize {
        assert!(self.is_valid(loc), "location out of range: {loc:?}");
        loc.row as usize * self.cols as usize + loc.col as usize
    }

    fn slot(&self, id: BlockId) -> &BlockSlot {
        self.slots[id.0 as usize]
            .as_ref()
            .expect("block has been destroyed")
    }

    fn slot_mut(&mut self, id: BlockId) -> &mut BlockSlot {
        self.slots[id.0 as usize]
            .as_mut()
            .expect("block has been destroyed")
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// The occupant of the cell at `loc`, if any. `loc` must be valid.
    pub fn get(&self, loc: Location) -> Option<BlockId> {
        self.cells[self.index(loc)]
    }

    pub fn color(&self, id: BlockId) -> BlockColor {
        self.slot(id).color
    }

    /// Where `id` currently sits, or `None` while it is detached.
    pub fn location(&self, id: BlockId) -> Option<Location> {
        self.slot(id).location
    }

    /// Every occupied location, eagerly collected in row-major order.
    pub fn occupied_locations(&self) -> Vec<Location> {
        let mut locs = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let loc = Location::new(row, col);
                if self.get(loc).is_some() {
                    locs.push(loc);
                }
            }
        }
        locs
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Creates a new detached block. It occupies no cell until `place`d.
    pub fn create_block(&mut self, color: BlockColor) -> BlockId {
        let slot = BlockSlot {
            color,
            location: None,
        };
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0 as usize] = Some(slot);
                id
            }
            None => {
                let id = BlockId(self.slots.len() as u32);
                self.slots.push(Some(slot));
                id
            }
        }
    }

    /// Puts a detached block into the cell at `loc`, returning the previous
    /// occupant if there was one.
    ///
    /// The write is an unconditional overwrite: a displaced occupant is not
    /// detached and its record still claims `loc`, even though the cell no
    /// longer points back at it. Callers that care about emptiness must
    /// check `get` first.
    pub fn place(&mut self, id: BlockId, loc: Location) -> Option<BlockId> {
        assert!(
            self.slot(id).location.is_none(),
            "block is already in the grid"
        );
        let idx = self.index(loc);
        let previous = self.cells[idx].replace(id);
        self.slot_mut(id).location = Some(loc);
        previous
    }

    /// Vacates the cell at `loc`, detaching and returning its occupant.
    pub fn remove(&mut self, loc: Location) -> Option<BlockId> {
        let idx = self.index(loc);
        let id = self.cells[idx].take()?;
        self.slot_mut(id).location = None;
        Some(id)
    }

    /// Detaches `id` from the grid, returning the location it occupied.
    /// The block must currently be a member.
    pub fn remove_block(&mut self, id: BlockId) -> Location {
        let loc = self
            .slot(id)
            .location
            .expect("block is not in the grid");
        let idx = self.index(loc);
        self.cells[idx] = None;
        self.slot_mut(id).location = None;
        loc
    }

    /// Relocates a member block to `new_loc` within the grid, with no
    /// intermediate detached state. The destination is overwritten without
    /// an occupancy check; gravity shifts rely on the destination being
    /// empty by construction.
    pub fn move_to(&mut self, id: BlockId, new_loc: Location) {
        let old = self
            .slot(id)
            .location
            .expect("block is not in the grid");
        let old_idx = self.index(old);
        let new_idx = self.index(new_loc);
        self.cells[old_idx] = None;
        self.cells[new_idx] = Some(id);
        self.slot_mut(id).location = Some(new_loc);
    }

    /// Retires a block for good: vacates its cell if it has one and returns
    /// the id to the pool's free list.
    pub fn destroy(&mut self, id: BlockId) {
        if let Some(loc) = self.slot(id).location {
            let idx = self.index(loc);
            self.cells[idx] = None;
        }
        self.slots[id.0 as usize] = None;
        self.free.push(id);
    }
}
