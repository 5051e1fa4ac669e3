//! Shared fixtures for the integration tests.

#![allow(dead_code)]

#[allow(unused_imports)]
pub use pdf_glyphs::fonts::test_fonts::*;

use pdf_glyphs::fonts::TrueTypeFont;
use std::sync::Arc;

/// Parse a synthetic font into a shareable handle.
pub fn load(data: Vec<u8>) -> Arc<TrueTypeFont> {
    Arc::new(TrueTypeFont::parse(data).expect("synthetic font parses"))
}

/// Byte offset of the directory record for `tag`.
pub fn directory_record(data: &[u8], tag: &[u8; 4]) -> Option<usize> {
    let num_tables = u16::from_be_bytes([data[4], data[5]]) as usize;
    (0..num_tables)
        .map(|i| 12 + i * 16)
        .find(|&at| &data[at..at + 4] == tag)
}

/// Content stream of an object as text.
pub fn text_of(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Raw bytes between `stream` and `endstream` of a serialized stream object.
pub fn stream_data(data: &[u8]) -> &[u8] {
    let find = |needle: &[u8]| data.windows(needle.len()).position(|w| w == needle);
    let start = find(b"\nstream\n").expect("stream keyword") + b"\nstream\n".len();
    let end = data.len() - b"\nendstream".len();
    &data[start..end]
}

/// Decompress a FlateDecode stream.
pub fn inflate(data: &[u8]) -> Vec<u8> {
    use std::io::Read;
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .expect("valid zlib data");
    out
}

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
