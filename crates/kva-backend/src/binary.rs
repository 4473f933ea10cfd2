//! Framed binary document codec.
//!
//! On-disk format:
//! ```text
//! [4 bytes: magic "KVAB"]
//! [4 bytes: format version (big-endian u32)]
//! [1 byte:  flags, bit 0 = zstd-compressed payload]
//! [4 bytes: CRC32 of payload (big-endian u32)]
//! [N bytes: payload (bincode-serialized record list, optionally zstd)]
//! ```

use std::io::Read;

use bincode::Options;
use kva_tree::Record;

use crate::config::BackendConfig;
use crate::document::{DocumentBackend, DocumentCodec};
use crate::error::{BackendError, BackendResult};

const MAGIC: &[u8; 4] = b"KVAB";
const VERSION: u32 = 2;
const FLAG_ZSTD: u8 = 0x01;
/// Magic + version + flags + CRC.
const HEADER_SIZE: usize = 13;

/// Stores the document as a checksummed bincode frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec;

impl DocumentCodec for BinaryCodec {
    const NAME: &'static str = "binary";

    fn encode(&self, records: &[Record], config: &BackendConfig) -> BackendResult<Vec<u8>> {
        let payload = wire()
            .serialize(records)
            .map_err(|e| BackendError::Serialization(e.to_string()))?;

        let (flags, payload) = match config.compression_level {
            Some(level) => {
                let compressed = zstd::encode_all(payload.as_slice(), level)
                    .map_err(|e| BackendError::Compression(e.to_string()))?;
                (FLAG_ZSTD, compressed)
            }
            None => (0, payload),
        };

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_be_bytes());
        out.push(flags);
        out.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    fn decode(&self, data: &[u8], config: &BackendConfig) -> BackendResult<Vec<Record>> {
        if data.len() < HEADER_SIZE {
            return Err(BackendError::Truncated(format!(
                "{} bytes, header needs {HEADER_SIZE}",
                data.len()
            )));
        }
        if &data[0..4] != MAGIC {
            return Err(BackendError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into_owned(),
                actual: String::from_utf8_lossy(&data[0..4]).into_owned(),
            });
        }
        let version = read_u32(&data[4..8]);
        if version != VERSION {
            return Err(BackendError::UnsupportedVersion(version));
        }
        let flags = data[8];
        if flags & !FLAG_ZSTD != 0 {
            return Err(BackendError::Parse(format!("unknown frame flags {flags:#04x}")));
        }
        let crc = read_u32(&data[9..13]);
        let payload = &data[HEADER_SIZE..];
        if crc32fast::hash(payload) != crc {
            return Err(BackendError::ChecksumMismatch);
        }

        let limit = config.max_document_bytes;
        let records = if flags & FLAG_ZSTD != 0 {
            let raw = inflate(payload, limit)?;
            wire().with_limit(limit).deserialize(&raw)
        } else {
            wire().with_limit(limit).deserialize(payload)
        };
        records.map_err(|e| BackendError::Parse(e.to_string()))
    }

    fn render(&self, data: &[u8]) -> String {
        hex::encode(data)
    }
}

/// Binary archive storage.
pub type BinaryBackend = DocumentBackend<BinaryCodec>;

/// Fixed-width integers, no trailing bytes.
fn wire() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Decompress at most `limit` bytes.
fn inflate(payload: &[u8], limit: u64) -> BackendResult<Vec<u8>> {
    let decoder = zstd::stream::read::Decoder::new(payload)
        .map_err(|e| BackendError::Compression(e.to_string()))?;
    let mut raw = Vec::new();
    decoder
        .take(limit.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|e| BackendError::Compression(e.to_string()))?;
    if raw.len() as u64 > limit {
        return Err(BackendError::TooLarge(limit));
    }
    Ok(raw)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
