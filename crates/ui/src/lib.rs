use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use zoning::ZoningUpdateSet;

pub mod keybinds;
pub mod theme;
pub mod zoning_panel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_systems(Startup, theme::apply_theme)
            .add_systems(
                Update,
                (zoning_panel::zoning_panel_ui, keybinds::zoning_keybinds)
                    .before(ZoningUpdateSet::Input),
            );
    }
}
