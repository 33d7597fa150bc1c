//! Assertion helpers for `TestTown` integration tests.

use bevy::prelude::*;

use crate::geometry::BlockSide;
use crate::preference::ZoningPreference;

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert every block of `road` on `side` is `depth` cells deep, with a
    /// valid area matching its size.
    pub fn assert_side_depth(&mut self, road: Entity, side: BlockSide, depth: i32) {
        let blocks = self.blocks_on(road, side);
        assert!(!blocks.is_empty(), "{road:?} has no blocks on {side:?}");
        for block in blocks {
            let actual = self.block_depth(block);
            assert_eq!(
                actual, depth,
                "Expected {block:?} on {side:?} of {road:?} to be {depth} deep, got {actual}"
            );
            let area = self.valid_area(block);
            assert_eq!(
                area.z1, depth,
                "Valid area of {block:?} out of step with its size: {area:?}"
            );
        }
    }

    /// Assert both sides of `road` are `depth` cells deep.
    pub fn assert_both_sides_depth(&mut self, road: Entity, depth: i32) {
        self.assert_side_depth(road, BlockSide::SideA, depth);
        self.assert_side_depth(road, BlockSide::SideB, depth);
    }

    pub fn assert_preference(&self, road: Entity, expected: ZoningPreference) {
        let actual = self.preference(road);
        assert_eq!(
            actual,
            Some(expected),
            "Expected {road:?} to prefer {expected}, got {actual:?}"
        );
    }

    pub fn assert_highlighted(&self, entity: Entity) {
        assert!(self.is_highlighted(entity), "Expected {entity:?} highlighted");
    }

    pub fn assert_not_highlighted(&self, entity: Entity) {
        assert!(
            !self.is_highlighted(entity),
            "Expected {entity:?} not highlighted"
        );
    }

    pub fn assert_despawned(&self, entity: Entity) {
        assert!(!self.exists(entity), "Expected {entity:?} to be despawned");
    }
}
