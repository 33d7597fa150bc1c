// ---------------------------------------------------------------------------
// SaveError: typed errors for the zoning save/load pipeline
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while writing or reading a zoning save file.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The file does not start with the zoning save magic bytes.
    NotASaveFile,
    /// The header is present but shorter than the fixed header size.
    Truncated { len: usize },
    /// Payload checksum does not match the header (data corruption).
    ChecksumMismatch { expected: u32, found: u32 },
    /// Header layout or save schema is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// LZ4 decompression failed.
    Decompress(String),
    /// Bitcode decoding failed (corrupt or invalid save data).
    Decode(String),
    /// No save data was available to load.
    NoData,
    /// A required resource was missing from the ECS world.
    MissingResource(&'static str),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::NotASaveFile => write!(f, "Not a zoning save file (bad magic bytes)"),
            SaveError::Truncated { len } => {
                write!(f, "Save file is truncated ({len} bytes, header needs 28)")
            }
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "Save file is corrupted: checksum mismatch (expected {expected:#010X}, got {found:#010X})"
            ),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::NoData => write!(f, "No save data available to load"),
            SaveError::MissingResource(name) => write!(f, "Missing required resource: {name}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decompress(e.to_string())
    }
}
