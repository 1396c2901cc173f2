//! Body decoder strategy
//!
//! Captured bodies are stored exactly as they crossed the wire. Before a record
//! is rendered the body is decoded according to its `Content-Encoding`.

use crate::utils::error::{ObserverError, Result};
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;
use tracing::warn;
use weezl::BitOrder;
use weezl::decode::Decoder as LzwDecoder;

/// LZW literal code width used by the `compress` content coding
const LZW_LITERAL_WIDTH: u8 = 8;

/// Decompression selected from a transfer-encoding label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyDecoder {
    /// Content is returned as-is
    #[default]
    Identity,
    /// Lempel-Ziv coding (LZ77) with a 32-bit CRC
    Gzip,
    /// zlib structure with the deflate compression algorithm
    Deflate,
    /// Lempel-Ziv-Welch, MSB bit order
    Compress,
}

impl BodyDecoder {
    /// Select the decoder for a `Content-Encoding` label.
    ///
    /// Empty and unsupported labels fall back to [`BodyDecoder::Identity`].
    pub fn for_encoding(encoding: &str) -> Self {
        match encoding.trim().to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => BodyDecoder::Gzip,
            "deflate" => BodyDecoder::Deflate,
            "compress" | "x-compress" => BodyDecoder::Compress,
            _ => BodyDecoder::Identity,
        }
    }

    /// Label used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            BodyDecoder::Identity => "identity",
            BodyDecoder::Gzip => "gzip",
            BodyDecoder::Deflate => "deflate",
            BodyDecoder::Compress => "compress",
        }
    }

    /// Decode a captured body into text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn decode(&self, content: &[u8]) -> Result<String> {
        let bytes = match self {
            BodyDecoder::Identity => {
                return Ok(String::from_utf8_lossy(content).into_owned());
            }
            BodyDecoder::Gzip => read_all(GzDecoder::new(content)),
            BodyDecoder::Deflate => {
                if has_zlib_header(content) {
                    read_all(ZlibDecoder::new(content))
                } else {
                    read_all(DeflateDecoder::new(content))
                }
            }
            BodyDecoder::Compress => LzwDecoder::new(BitOrder::Msb, LZW_LITERAL_WIDTH)
                .decode(content)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        };

        bytes
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| ObserverError::Decode {
                encoding: self.name(),
                source,
            })
    }

    /// Decode a body for rendering; failures are logged and yield empty text
    pub fn decode_or_empty(&self, content: &[u8]) -> String {
        match self.decode(content) {
            Ok(text) => text,
            Err(e) => {
                warn!(encoding = self.name(), error = %e, "Failed to decode captured body");
                String::new()
            }
        }
    }
}

fn read_all<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// RFC 1950 header check: CM = 8, CINFO <= 7 and FCHECK consistent
fn has_zlib_header(content: &[u8]) -> bool {
    match content {
        [cmf, flg, ..] => {
            (cmf & 0x0f) == 8
                && (cmf >> 4) <= 7
                && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0
        }
        _ => false,
    }
}
