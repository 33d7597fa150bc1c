//! Optional `zoning_settings.json` overrides. Missing fields keep their
//! defaults.

use std::fmt;
use std::io;
use std::path::Path;

use bevy::prelude::*;

use zoning::config::ZoningSettings;

pub const SETTINGS_FILE: &str = "zoning_settings.json";

#[derive(Debug)]
pub enum SettingsFileError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsFileError::Io(e) => write!(f, "cannot read settings file: {e}"),
            SettingsFileError::Parse(e) => write!(f, "invalid settings file: {e}"),
        }
    }
}

impl std::error::Error for SettingsFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsFileError::Io(e) => Some(e),
            SettingsFileError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for SettingsFileError {
    fn from(e: io::Error) -> Self {
        SettingsFileError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsFileError {
    fn from(e: serde_json::Error) -> Self {
        SettingsFileError::Parse(e)
    }
}

pub fn parse_settings(json: &str) -> Result<ZoningSettings, SettingsFileError> {
    Ok(serde_json::from_str(json)?)
}

/// Read overrides from `path`. `Ok(None)` when the file does not exist.
pub fn read_settings(path: &Path) -> Result<Option<ZoningSettings>, SettingsFileError> {
    match std::fs::read_to_string(path) {
        Ok(json) => parse_settings(&json).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Settings for this run: the file's overrides, or defaults when it is missing
/// or broken.
pub fn load_settings_or_default(path: &Path) -> ZoningSettings {
    match read_settings(path) {
        Ok(Some(settings)) => {
            info!("Loaded zoning settings from {}", path.display());
            settings
        }
        Ok(None) => ZoningSettings::default(),
        Err(e) => {
            warn!("{}: {}, using defaults", path.display(), e);
            ZoningSettings::default()
        }
    }
}
