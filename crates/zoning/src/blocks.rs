//! Zoning block records and the cell occupancy guard.
//!
//! Blocks are spawned and despawned by the host. The toolkit only changes the
//! depth (`size.y`, `ValidArea::z1`) or flags a block `Deleted` through
//! [`ZoningCommand`](crate::commands::ZoningCommand)s.

use bevy::prelude::*;

/// Rectangular zoning area attached to one road segment.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ZoneBlock {
    pub position: Vec3,
    /// Unit vector in the x/z plane pointing away from the road.
    pub direction: Vec2,
    /// `x` = cells along the road, `y` = depth in cells.
    pub size: IVec2,
}

impl ZoneBlock {
    pub fn ground_position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Active cell rectangle: `x` in `[x0, x1)`, `z` in `[z0, z1)`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidArea {
    pub x0: i32,
    pub x1: i32,
    pub z0: i32,
    pub z1: i32,
}

impl ValidArea {
    pub fn new(x0: i32, x1: i32, z0: i32, z1: i32) -> Self {
        Self { x0, x1, z0, z1 }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.z1 <= self.z0
    }

    /// Same rectangle with its far edge moved to `depth`.
    pub fn with_depth(self, depth: i32) -> Self {
        Self { z1: depth, ..self }
    }
}

/// Per-cell state bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const EMPTY: CellFlags = CellFlags(0);
    /// A building stands on the cell.
    pub const OCCUPIED: CellFlags = CellFlags(1);

    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneCell {
    pub state: CellFlags,
}

/// Cell buffer of a block, indexed `z * size.x + x`.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ZoneCells(pub Vec<ZoneCell>);

impl ZoneCells {
    /// Buffer of `width * depth` empty cells.
    pub fn empty(width: i32, depth: i32) -> Self {
        let len = (width.max(0) * depth.max(0)) as usize;
        Self(vec![ZoneCell::default(); len])
    }

    /// Set the occupied bit on cell `(x, z)` of a block `width` cells wide.
    /// Out-of-range coordinates are ignored.
    pub fn set_occupied(&mut self, width: i32, x: i32, z: i32, occupied: bool) {
        if x < 0 || z < 0 || x >= width {
            return;
        }
        let idx = (z * width + x) as usize;
        if let Some(cell) = self.0.get_mut(idx) {
            if occupied {
                cell.state.insert(CellFlags::OCCUPIED);
            } else {
                cell.state.remove(CellFlags::OCCUPIED);
            }
        }
    }
}

/// Segment that owns a block.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Entity);

/// Plain-value copy of everything the sizing rules read from a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSnapshot {
    pub entity: Entity,
    pub owner: Entity,
    pub position: Vec2,
    pub direction: Vec2,
    pub size: IVec2,
    pub valid_area: ValidArea,
    pub deleted: bool,
}

impl BlockSnapshot {
    pub fn new(
        entity: Entity,
        owner: Entity,
        block: &ZoneBlock,
        valid_area: ValidArea,
        deleted: bool,
    ) -> Self {
        Self {
            entity,
            owner,
            position: block.ground_position(),
            direction: block.direction,
            size: block.size,
            valid_area,
            deleted,
        }
    }
}

/// Whether any cell inside the active rectangle holds a building.
///
/// The rectangle is clamped to the buffer first (`[0, size_x)` across,
/// `[0, cells.len() / size_x)` deep), so the scan never reads past the cells the
/// block actually has. A zero-width block or an empty rectangle is unoccupied.
pub fn any_cell_occupied(cells: &[ZoneCell], size_x: i32, area: &ValidArea) -> bool {
    if size_x <= 0 || area.is_empty() {
        return false;
    }
    let rows = (cells.len() / size_x as usize) as i32;
    let x0 = area.x0.max(0);
    let x1 = area.x1.min(size_x);
    let z0 = area.z0.max(0);
    let z1 = area.z1.min(rows);
    if x1 <= x0 || z1 <= z0 {
        return false;
    }

    for z in z0..z1 {
        for x in x0..x1 {
            let idx = (z * size_x + x) as usize;
            if cells[idx].state.contains(CellFlags::OCCUPIED) {
                return true;
            }
        }
    }
    false
}
