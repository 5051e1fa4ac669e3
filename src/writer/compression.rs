//! Stream compression.
//!
//! Font programs, ToUnicode CMaps and (optionally) page content are written
//! with `/Filter /FlateDecode`.

use crate::error::{Error, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Compresses stream data.
pub trait StreamCompressor {
    /// Compress `data` at `level` (0 = store, 9 = best).
    fn compress(&self, data: &[u8], level: u32) -> Result<Vec<u8>>;

    /// Name of the PDF filter that decodes the output.
    fn filter_name(&self) -> &'static str {
        "FlateDecode"
    }
}

/// zlib/deflate compressor for `/FlateDecode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateCompressor;

impl StreamCompressor for FlateCompressor {
    fn compress(&self, data: &[u8], level: u32) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
        encoder
            .write_all(data)
            .map_err(|e| Error::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| Error::Compression(e.to_string()))
    }
}
