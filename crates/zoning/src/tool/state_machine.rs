//! Tool states, input signals and the transition tables.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ToolState {
    #[default]
    Default,
    Selecting,
    Selected,
}

/// One button as seen during a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonSignal {
    pub pressed_this_frame: bool,
    pub released_this_frame: bool,
    pub is_down: bool,
}

impl ButtonSignal {
    pub const IDLE: ButtonSignal = ButtonSignal {
        pressed_this_frame: false,
        released_this_frame: false,
        is_down: false,
    };
    pub const PRESSED: ButtonSignal = ButtonSignal {
        pressed_this_frame: true,
        released_this_frame: false,
        is_down: true,
    };
    pub const HELD: ButtonSignal = ButtonSignal {
        pressed_this_frame: false,
        released_this_frame: false,
        is_down: true,
    };
    pub const RELEASED: ButtonSignal = ButtonSignal {
        pressed_this_frame: false,
        released_this_frame: true,
        is_down: false,
    };
    /// Pressed and released within the same frame.
    pub const TAPPED: ButtonSignal = ButtonSignal {
        pressed_this_frame: true,
        released_this_frame: true,
        is_down: false,
    };
}

/// Apply and cancel buttons for the current frame, written by the host input
/// layer before the tool runs.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolInput {
    pub apply: ButtonSignal,
    pub cancel: ButtonSignal,
}

impl ToolInput {
    pub fn apply(apply: ButtonSignal) -> Self {
        Self {
            apply,
            cancel: ButtonSignal::IDLE,
        }
    }
}

pub fn next_state(state: ToolState, input: &ToolInput) -> ToolState {
    let apply = input.apply;
    match state {
        ToolState::Default => {
            if apply.pressed_this_frame && apply.released_this_frame {
                ToolState::Selected
            } else if apply.pressed_this_frame || apply.is_down {
                ToolState::Selecting
            } else if apply.released_this_frame {
                ToolState::Selected
            } else {
                ToolState::Default
            }
        }
        ToolState::Selecting => {
            if input.cancel.pressed_this_frame {
                ToolState::Default
            } else if apply.is_down {
                ToolState::Selecting
            } else if apply.released_this_frame {
                ToolState::Selected
            } else {
                ToolState::Selecting
            }
        }
        ToolState::Selected => ToolState::Default,
    }
}

/// Work bound to a `(previous, next)` state pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Highlight whatever is under the cursor.
    Hover,
    StartDrag,
    ContinueDrag,
    /// Write the working mode onto the selection.
    Commit,
    /// Single click: select the hovered segment, then commit.
    Tap,
    /// Drop the selection without writing anything.
    Abort,
}

pub fn transition_action(previous: ToolState, next: ToolState) -> Option<TransitionAction> {
    use ToolState::*;
    match (previous, next) {
        (Default, Default) => Some(TransitionAction::Hover),
        (Default, Selecting) => Some(TransitionAction::StartDrag),
        (Default, Selected) => Some(TransitionAction::Tap),
        (Selecting, Selecting) => Some(TransitionAction::ContinueDrag),
        (Selecting, Selected) => Some(TransitionAction::Commit),
        (Selecting, Default) => Some(TransitionAction::Abort),
        (Selected, Default) | (Selected, Selecting) | (Selected, Selected) => None,
    }
}

/// Current tool state, persistent across frames.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolStateMachine {
    state: ToolState,
}

impl ToolStateMachine {
    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Advance one frame. Returns the transition taken and its action, if any.
    pub fn step(&mut self, input: &ToolInput) -> (ToolState, ToolState, Option<TransitionAction>) {
        let previous = self.state;
        let next = next_state(previous, input);
        self.state = next;
        if previous != next {
            trace!("Zoning tool: {:?} -> {:?}", previous, next);
        }
        (previous, next, transition_action(previous, next))
    }

    pub fn reset(&mut self) {
        self.state = ToolState::Default;
    }
}
