//! # TestTown: headless harness for zoning integration tests
//!
//! Wraps a `bevy::app::App` with [`ZoningPlugin`] and the host lifecycle
//! stand-in, so tests can build roads, drive the selection tool frame by frame
//! and inspect block sizes without a window or renderer.

mod assertions;
mod queries;
mod spawning;

use bevy::app::App;
use bevy::prelude::*;

use crate::config::ZoningSettings;
use crate::host::HostLifecyclePlugin;
use crate::ZoningPlugin;

/// A headless Bevy App running the zoning toolkit.
///
/// Builder methods set up roads and settings; `tick()` advances the fixed
/// simulation step and `frame()` advances one rendered frame.
pub struct TestTown {
    app: App,
    next_key: u64,
}

impl TestTown {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty town with default settings.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ZoningPlugin);
        app.add_plugins(HostLifecyclePlugin);

        // Run one update so Startup systems execute.
        app.update();

        Self { app, next_key: 1 }
    }

    /// Replace the zoning settings.
    pub fn with_settings(mut self, settings: ZoningSettings) -> Self {
        self.app.insert_resource(settings);
        self
    }

    // -----------------------------------------------------------------------
    // Raw access
    // -----------------------------------------------------------------------

    pub fn app(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    fn depth(&self) -> i32 {
        self.world()
            .get_resource::<ZoningSettings>()
            .map(ZoningSettings::effective_depth)
            .unwrap_or_default()
    }
}

impl Default for TestTown {
    fn default() -> Self {
        Self::new()
    }
}
