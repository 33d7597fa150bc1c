//! Keeps pointer input over egui panels away from the world.

use bevy_egui::EguiContexts;

/// Returns `true` when the cursor is over an egui panel or egui is handling a
/// drag or click.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}
