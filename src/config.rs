//! Configuration for font embedding and page rendering.

use serde::{Deserialize, Serialize};

/// How the program of an embedded TrueType font is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontEmbeddingMode {
    /// Embed a subset of the font (blank unused outlines, tag the name)
    #[default]
    Subset,
    /// Embed the original font program unchanged
    Full,
}

/// Font embedding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Flate compression level (0-9) for FontFile2 and ToUnicode streams.
    pub compression_level: u32,

    /// Subset or full embedding.
    pub embedding_mode: FontEmbeddingMode,

    /// Drop hinting tables (`cvt `, `fpgm`, `prep`) from subsets.
    pub strip_hinting: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbedConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            compression_level: 6,
            embedding_mode: FontEmbeddingMode::Subset,
            strip_hinting: false,
        }
    }

    /// Set the compression level (clamped to 0-9).
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// Set the embedding mode.
    pub fn with_embedding_mode(mut self, mode: FontEmbeddingMode) -> Self {
        self.embedding_mode = mode;
        self
    }

    /// Drop hinting tables from subsets.
    pub fn with_strip_hinting(mut self, strip: bool) -> Self {
        self.strip_hinting = strip;
        self
    }

    /// Whether fonts are subset.
    pub fn subsetting(&self) -> bool {
        self.embedding_mode == FontEmbeddingMode::Subset
    }
}

/// Page rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum number of decimals written for operands.
    pub precision: usize,

    /// Compress page content streams.
    pub compress_content: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            precision: 4,
            compress_content: false,
        }
    }

    /// Set the operand precision (clamped to 0-6).
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.min(6);
        self
    }

    /// Compress page content streams.
    pub fn with_compress_content(mut self, compress: bool) -> Self {
        self.compress_content = compress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_config_defaults() {
        let config = EmbedConfig::default();
        assert_eq!(config.compression_level, 6);
        assert!(config.subsetting());
        assert!(!config.strip_hinting);
    }

    #[test]
    fn test_embed_config_builder() {
        let config = EmbedConfig::new()
            .with_compression_level(42)
            .with_embedding_mode(FontEmbeddingMode::Full);
        assert_eq!(config.compression_level, 9);
        assert!(!config.subsetting());
    }

    #[test]
    fn test_render_config_precision_clamped() {
        let config = RenderConfig::new().with_precision(12);
        assert_eq!(config.precision, 6);
    }
}
