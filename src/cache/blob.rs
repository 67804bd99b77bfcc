// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Cache blob codec.
//!
//! A cache blob is the serialized index tagged with the schema version that
//! produced it. On disk it looks like this:
//!
//! ```text
//! ┌──────────┬─────────┬───────┬──────────┬─────────────┬─────────┬───────┬──────────┐
//! │ "SIFT"   │ version │ flags │ reserved │ payload len │ payload │ CRC32 │ "TFIS"   │
//! │ 4 bytes  │ u8      │ u8    │ 2 bytes  │ u32 LE      │ …       │ u32LE │ 4 bytes  │
//! └──────────┴─────────┴───────┴──────────┴─────────────┴─────────┴───────┴──────────┘
//! ```
//!
//! The CRC covers everything before the footer. A blob that fails any check
//! is not trusted; the engine treats it as "no cache" and rebuilds.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Header magic: "SIFT".
pub const MAGIC: [u8; 4] = *b"SIFT";

/// Footer magic: "TFIS" (the header magic reversed).
pub const FOOTER_MAGIC: [u8; 4] = *b"TFIS";

/// Header size: magic + version + flags + reserved + payload length.
pub const HEADER_SIZE: usize = 12;

/// Footer size: CRC32 + magic.
pub const FOOTER_SIZE: usize = 8;

/// Largest payload accepted on decode (256 MB).
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// Payload is brotli-compressed.
pub const FLAG_BROTLI: u8 = 0b0000_0001;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_WINDOW: u32 = 22;

/// Cache failures. None of these reach the search path: a blob that cannot
/// be decoded means the index is rebuilt.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid cache magic: {0:?}")]
    BadMagic([u8; 4]),

    #[error("cache blob truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("cache checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("unsupported cache schema version {0}")]
    UnsupportedSchema(u8),

    #[error("cache payload too large: {0} bytes")]
    TooLarge(usize),

    #[error("cache payload decompression failed: {0}")]
    Decompression(#[source] io::Error),

    #[error("cache store I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Versions of the cached index layout.
///
/// Only [`SchemaVersion::CURRENT`] is loaded as-is. Anything else forces a
/// full rebuild; there is no migration between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SchemaVersion {
    /// Four indexed fields, no display name.
    V1 = 1,
    /// Five indexed fields with per-field length sums.
    V2 = 2,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V2;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_current(self) -> bool {
        self == Self::CURRENT
    }
}

/// A serialized index and the schema version it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBlob {
    pub schema_version: SchemaVersion,
    pub serialized_index: Vec<u8>,
}

impl CacheBlob {
    /// Wrap an index serialized with the current schema.
    pub fn current(serialized_index: Vec<u8>) -> Self {
        Self {
            schema_version: SchemaVersion::CURRENT,
            serialized_index,
        }
    }

    /// Encode to bytes, brotli-compressing the payload.
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        let mut payload = Vec::new();
        {
            let mut encoder = brotli::CompressorWriter::new(
                &mut payload,
                BROTLI_BUFFER,
                BROTLI_QUALITY,
                BROTLI_WINDOW,
            );
            encoder.write_all(&self.serialized_index)?;
            encoder.flush()?;
        }
        if payload.len() > u32::MAX as usize {
            return Err(CacheError::TooLarge(payload.len()));
        }

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len() + FOOTER_SIZE);
        out.extend_from_slice(&MAGIC);
        out.push(self.schema_version.as_u8());
        out.push(FLAG_BROTLI);
        out.extend_from_slice(&[0u8; 2]); // reserved
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        let crc = compute_crc32(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&FOOTER_MAGIC);
        Ok(out)
    }

    /// Decode and verify a blob.
    ///
    /// Checks run cheapest first: magic, length, footer, checksum, then the
    /// schema version, and only then is the payload decompressed.
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(CacheError::Truncated {
                expected: HEADER_SIZE + FOOTER_SIZE,
                actual: bytes.len(),
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(CacheError::BadMagic(magic));
        }
        let version = bytes[4];
        let flags = bytes[5];
        // bytes[6..8] is reserved
        let payload_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(CacheError::TooLarge(payload_len));
        }

        let expected = HEADER_SIZE + payload_len + FOOTER_SIZE;
        if bytes.len() < expected {
            return Err(CacheError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let footer_start = HEADER_SIZE + payload_len;
        let footer = &bytes[footer_start..expected];
        let footer_magic = [footer[4], footer[5], footer[6], footer[7]];
        if footer_magic != FOOTER_MAGIC {
            return Err(CacheError::BadMagic(footer_magic));
        }
        let stored = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let computed = compute_crc32(&bytes[..footer_start]);
        if stored != computed {
            return Err(CacheError::ChecksumMismatch { stored, computed });
        }

        let schema_version =
            SchemaVersion::from_u8(version).ok_or(CacheError::UnsupportedSchema(version))?;

        let payload = &bytes[HEADER_SIZE..footer_start];
        let serialized_index = if flags & FLAG_BROTLI != 0 {
            let mut out = Vec::new();
            brotli::Decompressor::new(payload, BROTLI_BUFFER)
                .take(MAX_PAYLOAD_SIZE as u64 + 1)
                .read_to_end(&mut out)
                .map_err(CacheError::Decompression)?;
            if out.len() > MAX_PAYLOAD_SIZE {
                return Err(CacheError::TooLarge(out.len()));
            }
            out
        } else {
            payload.to_vec()
        };

        Ok(Self {
            schema_version,
            serialized_index,
        })
    }
}

fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
