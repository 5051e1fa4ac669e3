//! Error types for font embedding and content-stream rendering.
//!
//! Every fallible operation in the crate returns [`Result`], so font
//! loading, subsetting and object construction all share one error type.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading fonts or writing PDF objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Font data is not a TrueType file we understand
    #[error("Invalid font format: {0}")]
    InvalidFormat(String),

    /// Font container is recognised but not supported (CFF, collections)
    #[error("Unsupported font format: {0}")]
    UnsupportedFormat(String),

    /// A table directory entry points outside the font data
    #[error("Table '{tag}' out of bounds: offset {offset} + length {length} exceeds file size {file_len}")]
    TableOutOfBounds {
        /// Table tag
        tag: String,
        /// Declared table offset
        offset: u32,
        /// Declared table length
        length: u32,
        /// Size of the font data
        file_len: usize,
    },

    /// A table is shorter than the structure read from it
    #[error("Table '{table}' truncated at byte {offset}")]
    Truncated {
        /// Table tag
        table: String,
        /// Offset within the table where data ran out
        offset: usize,
    },

    /// A table required to build the font model is absent
    #[error("Missing required table: {0}")]
    MissingTable(String),

    /// IO error (font files, compressor output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream compression failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Building one of the objects of an embedded font failed
    #[error("Failed to write font '{font}': {source}")]
    FontWrite {
        /// Base font name
        font: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A resource key was serialized before an object number was bound to it
    #[error("Unresolved resource: {0}")]
    UnresolvedResource(String),

    /// Font error
    #[error("Font error: {0}")]
    Font(String),
}

impl Error {
    /// Shorthand for a truncated read inside a table.
    pub(crate) fn truncated(table: &str, offset: usize) -> Self {
        Error::Truncated {
            table: table.to_string(),
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_error() {
        let err = Error::InvalidFormat("sfnt version 0x4F54544F".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid font format"));
        assert!(msg.contains("0x4F54544F"));
    }

    #[test]
    fn test_table_out_of_bounds_error() {
        let err = Error::TableOutOfBounds {
            tag: "glyf".to_string(),
            offset: 100,
            length: 5000,
            file_len: 1024,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("glyf"));
        assert!(msg.contains("5000"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_truncated_error() {
        let err = Error::truncated("cmap", 42);
        let msg = format!("{}", err);
        assert!(msg.contains("cmap"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_font_write_error_keeps_source() {
        let err = Error::FontWrite {
            font: "DejaVuSans".to_string(),
            source: Box::new(Error::Compression("stream ended".to_string())),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("DejaVuSans"));
        assert!(msg.contains("stream ended"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
