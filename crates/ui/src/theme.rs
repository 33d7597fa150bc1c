//! Panel colors. Mode accents reuse the block gizmo colors so a mode's label
//! matches the sides it leaves zoned on the map.

use bevy_egui::{egui, EguiContexts};
use zoning::preference::ZoningPreference;

const PANEL: egui::Color32 = egui::Color32::from_rgb(30, 34, 38);
const WIDGET: egui::Color32 = egui::Color32::from_rgb(46, 52, 58);
const WIDGET_HOVER: egui::Color32 = egui::Color32::from_rgb(62, 72, 80);
/// Same blue as the tool's road highlight.
const SELECTION: egui::Color32 = egui::Color32::from_rgb(51, 179, 255);

const SIDE_A: egui::Color32 = egui::Color32::from_rgb(89, 204, 102);
const SIDE_B: egui::Color32 = egui::Color32::from_rgb(242, 166, 64);
const NO_SIDES: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);

pub const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 220, 80);
pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 60, 60);
pub const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(160, 160, 160);

/// Label color for a mode in the panel.
pub fn mode_accent(mode: ZoningPreference) -> egui::Color32 {
    match mode {
        ZoningPreference::Left => SIDE_A,
        ZoningPreference::Right => SIDE_B,
        ZoningPreference::Default => SELECTION,
        ZoningPreference::None => NO_SIDES,
    }
}

pub fn apply_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();
    let visuals = &mut style.visuals;

    visuals.window_fill = PANEL;
    visuals.panel_fill = PANEL;
    for widgets in [&mut visuals.widgets.inactive, &mut visuals.widgets.hovered] {
        widgets.corner_radius = egui::CornerRadius::same(4);
    }
    visuals.widgets.inactive.bg_fill = WIDGET;
    visuals.widgets.inactive.weak_bg_fill = WIDGET;
    visuals.widgets.hovered.bg_fill = WIDGET_HOVER;
    visuals.widgets.hovered.weak_bg_fill = WIDGET_HOVER;
    visuals.widgets.active.bg_fill = SELECTION;
    // Checked radio buttons and checkboxes draw with the selection color.
    visuals.selection.bg_fill = SELECTION;
    visuals.selection.stroke = egui::Stroke::new(1.0, SELECTION);
    visuals.window_corner_radius = egui::CornerRadius::same(6);

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_accents_are_distinct() {
        let accents: std::collections::HashSet<_> = ZoningPreference::ALL
            .iter()
            .map(|m| mode_accent(*m))
            .collect();
        assert_eq!(accents.len(), ZoningPreference::ALL.len());
    }

    #[test]
    fn test_one_sided_modes_use_side_colors() {
        assert_eq!(mode_accent(ZoningPreference::Left), SIDE_A);
        assert_eq!(mode_accent(ZoningPreference::Right), SIDE_B);
    }
}
