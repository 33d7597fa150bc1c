//! Mouse and keyboard to [`ToolInput`].
//!
//! Left mouse applies. Right mouse or Escape cancels. A press that starts over
//! an egui panel belongs to the panel until it is released.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use zoning::tool::{ButtonSignal, ToolInput};

use crate::egui_input_guard::egui_wants_pointer;

pub fn button_signal<T>(input: &ButtonInput<T>, button: T) -> ButtonSignal
where
    T: Copy + Eq + std::hash::Hash + Send + Sync + 'static,
{
    ButtonSignal {
        pressed_this_frame: input.just_pressed(button),
        released_this_frame: input.just_released(button),
        is_down: input.pressed(button),
    }
}

/// Either button counts.
pub fn merge_signals(a: ButtonSignal, b: ButtonSignal) -> ButtonSignal {
    ButtonSignal {
        pressed_this_frame: a.pressed_this_frame || b.pressed_this_frame,
        released_this_frame: a.released_this_frame || b.released_this_frame,
        is_down: a.is_down || b.is_down,
    }
}

/// Apply-button press currently owned by egui.
#[derive(Resource, Debug, Default)]
pub struct PointerCapturedByUi(pub bool);

pub fn write_tool_input(
    mut contexts: EguiContexts,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut captured: ResMut<PointerCapturedByUi>,
    mut input: ResMut<ToolInput>,
) {
    let over_ui = egui_wants_pointer(&mut contexts);
    if buttons.just_pressed(MouseButton::Left) {
        captured.0 = over_ui;
    }

    let apply = if captured.0 {
        ButtonSignal::IDLE
    } else {
        button_signal(&buttons, MouseButton::Left)
    };
    let right = if over_ui {
        ButtonSignal::IDLE
    } else {
        button_signal(&buttons, MouseButton::Right)
    };
    let cancel = merge_signals(right, button_signal(&keys, KeyCode::Escape));

    if !buttons.pressed(MouseButton::Left) {
        captured.0 = false;
    }

    let next = ToolInput { apply, cancel };
    if *input != next {
        *input = next;
    }
}
