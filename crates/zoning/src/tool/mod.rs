//! Selection tool: hover, drag-select and commit a zoning preference onto road
//! segments.
//!
//! The pure state machine lives in `state_machine`; `systems` binds its
//! transitions to the cursor, the highlight markers and the command buffer.

pub mod state_machine;
pub mod systems;


pub use state_machine::*;
pub use systems::*;
