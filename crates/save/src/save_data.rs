// ---------------------------------------------------------------------------
// SaveData: the top-level save file struct
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::file_header::{decode_payload, unwrap_header, wrap_with_header_compressed};
use crate::save_error::SaveError;

/// Current save schema version.
/// v1 = per-segment preferences keyed by `SegmentKey`, extension map
pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveData {
    #[serde(default)]
    pub version: u32,
    /// `(segment key, preference ordinal)`, sorted by key. Segments at the
    /// implicit `Default` are still written so a load can tell "saved as
    /// Default" from "not in this save".
    pub preferences: Vec<(u64, u32)>,
    /// Each key is a `SavedResource::SAVE_KEY`, value is bitcode-encoded bytes.
    #[serde(default)]
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl SaveData {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }

    /// Full file contents: header plus compressed payload.
    pub fn to_file_bytes(&self) -> Vec<u8> {
        wrap_with_header_compressed(&self.encode())
    }

    /// Validate, decompress and decode a save file.
    pub fn from_file_bytes(bytes: &[u8]) -> Result<Self, SaveError> {
        let (header, payload) = unwrap_header(bytes)?;
        let raw = decode_payload(&header, payload)?;
        let save = Self::decode(&raw)?;
        if save.version > CURRENT_SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected_max: CURRENT_SAVE_VERSION,
                found: save.version,
            });
        }
        Ok(save)
    }
}
