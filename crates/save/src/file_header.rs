// ---------------------------------------------------------------------------
// file_header – Save file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "ZTKS"
//   [4..8]   Header format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4 compressed)
//   [12..20] Timestamp (Unix epoch seconds, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)
//
// On save: encode SaveData -> compress -> prepend header (checksum of stored bytes)
// On load: check magic -> validate checksum -> strip header -> decompress -> decode

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a zoning toolkit save file.
pub const MAGIC: [u8; 4] = *b"ZTKS";

pub const HEADER_SIZE: usize = 28;

/// Version of the header layout itself, distinct from the `SaveData` schema
/// version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is LZ4 block-compressed with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    fn for_payload(stored: &[u8], uncompressed_size: usize, flags: u32) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size: uncompressed_size as u32,
            checksum: xxh32(stored, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

/// Wrap an uncompressed payload: `[header] ++ [data]`.
pub fn wrap_with_header(data: &[u8]) -> Vec<u8> {
    let header = FileHeader::for_payload(data, data.len(), 0);
    let mut out = Vec::with_capacity(HEADER_SIZE + data.len());
    header.write_to(&mut out);
    out.extend_from_slice(data);
    out
}

/// Compress `data` with LZ4 and wrap it with a header flagged compressed.
pub fn wrap_with_header_compressed(data: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress_prepend_size(data);
    let header = FileHeader::for_payload(&compressed, data.len(), FLAG_COMPRESSED);
    let mut out = Vec::with_capacity(HEADER_SIZE + compressed.len());
    header.write_to(&mut out);
    out.extend_from_slice(&compressed);
    out
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the header, returning it with the stored payload.
///
/// # Errors
///
/// - [`SaveError::NotASaveFile`] if the magic bytes are missing
/// - [`SaveError::Truncated`] if the buffer is shorter than the header
/// - [`SaveError::VersionMismatch`] for a header from a newer build
/// - [`SaveError::ChecksumMismatch`] if the payload was modified or damaged
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(SaveError::NotASaveFile);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated { len: bytes.len() });
    }

    let format_version = le_u32(bytes, 4);
    if format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: format_version,
        });
    }

    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let header = FileHeader {
        format_version,
        flags: le_u32(bytes, 8),
        timestamp: u64::from_le_bytes(timestamp),
        uncompressed_size: le_u32(bytes, 20),
        checksum: le_u32(bytes, 24),
    };

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found: computed,
        });
    }

    Ok((header, payload))
}

/// Undo [`wrap_with_header_compressed`]'s compression step, or copy the payload
/// when the header says it is stored raw.
pub fn decode_payload(header: &FileHeader, payload: &[u8]) -> Result<Vec<u8>, SaveError> {
    if header.is_compressed() {
        Ok(lz4_flex::decompress_size_prepended(payload)?)
    } else {
        Ok(payload.to_vec())
    }
}
