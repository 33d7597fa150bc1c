//! Per-segment zoning preference: which side(s) of a road receive blocks.

use std::fmt;
use std::str::FromStr;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::geometry::BlockSide;

/// Side assignment chosen for a road segment.
///
/// Stored as a component on the segment entity. The discriminants are the
/// persisted ordinals and must never be reordered.
#[derive(
    Component,
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(u32)]
pub enum ZoningPreference {
    Left = 0,
    Right = 1,
    /// Both sides zoned, the host's behaviour without the toolkit.
    #[default]
    Default = 2,
    None = 3,
}

impl ZoningPreference {
    pub const ALL: [ZoningPreference; 4] = [
        ZoningPreference::Left,
        ZoningPreference::Right,
        ZoningPreference::Default,
        ZoningPreference::None,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Unknown ordinals (from a newer or corrupted save) map to `Default`.
    pub fn from_ordinal(ordinal: u32) -> Self {
        match ordinal {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Default,
            3 => Self::None,
            _ => Self::Default,
        }
    }

    /// Serialized form: the ordinal as a little-endian `u32`.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.ordinal().to_le_bytes()
    }

    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        match bytes.get(..4).and_then(|b| <[u8; 4]>::try_from(b).ok()) {
            Some(raw) => Self::from_ordinal(u32::from_le_bytes(raw)),
            None => Self::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Default => "Default",
            Self::None => "None",
        }
    }

    /// Parse a UI mode string, falling back to `Default` for anything unknown.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Self::Default)
    }

    /// Whether blocks on `side` should be removed under this preference.
    pub fn excludes(self, side: BlockSide) -> bool {
        match (self, side) {
            (Self::None, _) => true,
            (Self::Default, _) => false,
            (Self::Left, BlockSide::SideB) => true,
            (Self::Left, BlockSide::SideA) => false,
            (Self::Right, BlockSide::SideA) => true,
            (Self::Right, BlockSide::SideB) => false,
        }
    }
}

impl fmt::Display for ZoningPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string names none of the four preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePreferenceError {
    pub input: String,
}

impl fmt::Display for ParsePreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown zoning mode '{}': expected Left, Right, Default or None",
            self.input
        )
    }
}

impl std::error::Error for ParsePreferenceError {}

impl FromStr for ZoningPreference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePreferenceError {
                input: s.to_string(),
            })
    }
}

/// Read access to the preference store.
///
/// Writes never go through here: they are staged as
/// [`ZoningCommand::SetPreference`](crate::commands::ZoningCommand) and applied
/// at the command flush.
#[derive(SystemParam)]
pub struct SegmentPreferences<'w, 's> {
    preferences: Query<'w, 's, &'static ZoningPreference>,
}

impl SegmentPreferences<'_, '_> {
    pub fn get(&self, segment: Entity) -> Option<ZoningPreference> {
        self.preferences.get(segment).ok().copied()
    }

    pub fn get_or_default(&self, segment: Entity) -> ZoningPreference {
        self.get(segment).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_round_trip_all_variants() {
        for pref in ZoningPreference::ALL {
            assert_eq!(ZoningPreference::from_ordinal(pref.ordinal()), pref);
            assert_eq!(ZoningPreference::from_le_bytes(&pref.to_le_bytes()), pref);
        }
    }

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(ZoningPreference::Left.ordinal(), 0);
        assert_eq!(ZoningPreference::Right.ordinal(), 1);
        assert_eq!(ZoningPreference::Default.ordinal(), 2);
        assert_eq!(ZoningPreference::None.ordinal(), 3);
    }

    #[test]
    fn test_unknown_ordinal_is_default() {
        assert_eq!(ZoningPreference::from_ordinal(17), ZoningPreference::Default);
        assert_eq!(
            ZoningPreference::from_le_bytes(&99u32.to_le_bytes()),
            ZoningPreference::Default
        );
    }

    #[test]
    fn test_truncated_bytes_are_default() {
        assert_eq!(ZoningPreference::from_le_bytes(&[1, 0]), ZoningPreference::Default);
        assert_eq!(ZoningPreference::from_le_bytes(&[]), ZoningPreference::Default);
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!("Left".parse::<ZoningPreference>(), Ok(ZoningPreference::Left));
        assert_eq!("none".parse::<ZoningPreference>(), Ok(ZoningPreference::None));
        assert!("Diagonal".parse::<ZoningPreference>().is_err());
        assert_eq!(
            ZoningPreference::parse_lenient("Diagonal"),
            ZoningPreference::Default
        );
    }

    #[test]
    fn test_parse_error_message_names_input() {
        let err = "Up".parse::<ZoningPreference>().unwrap_err();
        assert!(err.to_string().contains("'Up'"), "got: {err}");
    }

    #[test]
    fn test_excludes_matrix() {
        use BlockSide::{SideA, SideB};
        assert!(!ZoningPreference::Default.excludes(SideA));
        assert!(!ZoningPreference::Default.excludes(SideB));
        assert!(ZoningPreference::None.excludes(SideA));
        assert!(ZoningPreference::None.excludes(SideB));
        assert!(ZoningPreference::Right.excludes(SideA));
        assert!(!ZoningPreference::Right.excludes(SideB));
        assert!(ZoningPreference::Left.excludes(SideB));
        assert!(!ZoningPreference::Left.excludes(SideA));
    }
}
