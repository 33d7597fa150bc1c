//! Persistence for the zoning toolkit: per-segment preferences keyed by
//! `SegmentKey`, plus every registered `SavedResource`.

mod atomic_write;
pub mod file_header;
pub mod save_data;
pub mod save_error;
mod save_plugin;
pub mod snapshot;

#[cfg(test)]
mod save_plugin_tests;

pub use save_data::{SaveData, CURRENT_SAVE_VERSION};
pub use save_error::SaveError;
pub use save_plugin::{
    load_from_bytes, save_to_path, LoadZoningEvent, SaveFilePath, SaveLoadState, SavePlugin,
    SaveStatus, SaveZoningEvent,
};
pub use snapshot::{collect_save_data, restore_save_data, RestoreReport};
