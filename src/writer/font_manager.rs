//! Font management for PDF generation.
//!
//! A [`FontCollection`] knows every font a page can use: the PDF Base-14
//! fonts and registered TrueType fonts. Scanning the page's operations
//! records which characters each embedded font must carry; building the
//! subsets yields [`BoundFonts`], the only thing the renderer accepts.
//!
//! # Embedded Fonts
//!
//! Per ISO 32000-1 sections 9.6-9.9, embedded fonts use:
//! - CIDFont (Type 2) for TrueType fonts
//! - Identity-H encoding for Unicode
//! - ToUnicode CMap for text extraction
//! - Font subsetting for reduced file size

use super::compression::StreamCompressor;
use super::font_embedder::{write_font, write_standard_font};
use super::object_ids::ObjectIdAllocator;
use super::resources::ResourceDictionary;
use crate::config::EmbedConfig;
use crate::elements::{FontRef, GraphicsOp, TextOp};
use crate::error::{Error, Result};
use crate::fonts::{BuiltSubset, FontSubset, SubsetOptions, TrueTypeFont};
use crate::object::IndirectObject;
use indexmap::IndexMap;
use std::sync::Arc;

/// The PDF Base-14 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Helvetica-Oblique
    HelveticaOblique,
    /// Helvetica-BoldOblique
    HelveticaBoldOblique,
    /// Times-Roman
    TimesRoman,
    /// Times-Bold
    TimesBold,
    /// Times-Italic
    TimesItalic,
    /// Times-BoldItalic
    TimesBoldItalic,
    /// Courier
    Courier,
    /// Courier-Bold
    CourierBold,
    /// Courier-Oblique
    CourierOblique,
    /// Courier-BoldOblique
    CourierBoldOblique,
    /// Symbol
    Symbol,
    /// ZapfDingbats
    ZapfDingbats,
}

impl StandardFont {
    /// All fourteen fonts.
    pub const ALL: [StandardFont; 14] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
        StandardFont::Symbol,
        StandardFont::ZapfDingbats,
    ];

    /// PostScript name used for `/BaseFont`.
    pub fn name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Look up a font by its PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|font| font.name() == name)
    }

    /// Whether text is written in WinAnsiEncoding (all but the symbolic fonts).
    pub fn uses_win_ansi(self) -> bool {
        !matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }
}

/// A font as seen by the renderer.
#[derive(Debug, Clone, Copy)]
pub enum BoundFont<'a> {
    /// Base-14 font, shown with literal strings
    Standard(StandardFont),
    /// Embedded TrueType subset, shown with hex glyph IDs
    Embedded(BuiltSubset<'a>),
}

/// Fonts referenced by a page.
///
/// Register TrueType fonts with [`add_font`](Self::add_font), record usage
/// with [`scan`](Self::scan), then call [`build_all`](Self::build_all).
#[derive(Debug, Default)]
pub struct FontCollection {
    /// Standard fonts by logical key (`std:<name>`)
    standard: IndexMap<String, StandardFont>,
    /// Subsets by logical key (`custom:<id>`)
    embedded: IndexMap<String, FontSubset>,
    options: SubsetOptions,
}

impl FontCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection whose subsets follow `config`.
    pub fn with_config(config: &EmbedConfig) -> Self {
        Self {
            options: SubsetOptions::from(config),
            ..Self::default()
        }
    }

    /// Register a TrueType font under `id`; text refers to it as
    /// `FontRef::Custom(id)`.
    ///
    /// Re-registering an id replaces the font and forgets its usage.
    pub fn add_font(&mut self, id: impl Into<String>, font: Arc<TrueTypeFont>) {
        let key = FontRef::Custom(id.into()).key();
        let subset = FontSubset::new(font).with_options(self.options);
        self.embedded.insert(key, subset);
    }

    /// The subset tracking a registered font.
    pub fn subset(&self, id: &str) -> Option<&FontSubset> {
        self.embedded.get(&FontRef::Custom(id.to_string()).key())
    }

    /// Record the fonts and characters used by a page.
    ///
    /// Fails on a custom font that was never registered or a standard font
    /// name outside the Base-14 set.
    pub fn scan(&mut self, graphics: &[GraphicsOp], text: &[TextOp]) -> Result<()> {
        for op in graphics {
            if let GraphicsOp::TextBlock { text, .. } = op {
                for run in text {
                    self.use_text(run)?;
                }
            }
        }
        for run in text {
            self.use_text(run)?;
        }
        Ok(())
    }

    /// Record one text run.
    pub fn use_text(&mut self, op: &TextOp) -> Result<()> {
        let key = op.font.key();
        match &op.font {
            FontRef::Standard(name) => {
                if !self.standard.contains_key(&key) {
                    let font = StandardFont::from_name(name)
                        .ok_or_else(|| Error::Font(format!("'{}' is not a standard font", name)))?;
                    self.standard.insert(key, font);
                }
            },
            FontRef::Custom(id) => {
                let subset = self
                    .embedded
                    .get_mut(&key)
                    .ok_or_else(|| Error::Font(format!("font '{}' is not registered", id)))?;
                // Line breaks are layout, not glyphs
                subset.use_string(&op.text.replace('\n', ""));
            },
        }
        Ok(())
    }

    /// Build every subset and bind the fonts for rendering.
    pub fn build_all(&mut self) -> Result<BoundFonts<'_>> {
        for subset in self.embedded.values_mut() {
            subset.build()?;
        }

        let mut fonts: IndexMap<String, BoundFont<'_>> = self
            .standard
            .iter()
            .map(|(key, font)| (key.clone(), BoundFont::Standard(*font)))
            .collect();
        for (key, subset) in &self.embedded {
            let built = subset
                .built()
                .ok_or_else(|| Error::Font(format!("subset for '{}' is not built", key)))?;
            fonts.insert(key.clone(), BoundFont::Embedded(built));
        }
        Ok(BoundFonts { fonts })
    }
}

/// Fonts ready for rendering: standard fonts plus built subsets.
#[derive(Debug, Clone, Default)]
pub struct BoundFonts<'a> {
    fonts: IndexMap<String, BoundFont<'a>>,
}

impl<'a> BoundFonts<'a> {
    /// Font for a logical key.
    pub fn get(&self, key: &str) -> Option<BoundFont<'a>> {
        self.fonts.get(key).copied()
    }

    /// Number of bound fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font is bound.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Write every font the page's resources name and bind their object
    /// numbers.
    ///
    /// Embedded fonts produce five objects each, standard fonts one.
    pub fn write_fonts(
        &self,
        resources: &mut ResourceDictionary,
        ids: &mut dyn ObjectIdAllocator,
        compressor: &dyn StreamCompressor,
        config: &EmbedConfig,
    ) -> Result<Vec<IndirectObject>> {
        let keys: Vec<String> = resources.keys().map(str::to_string).collect();
        let mut objects = Vec::new();

        for key in keys {
            let font = self
                .get(&key)
                .ok_or_else(|| Error::UnresolvedResource(key.clone()))?;
            let number = match font {
                BoundFont::Standard(standard) => {
                    let obj = write_standard_font(standard, ids);
                    let number = obj.number;
                    objects.push(obj);
                    number
                },
                BoundFont::Embedded(subset) => {
                    let (objs, refs) = write_font(&subset, ids, compressor, config)?;
                    objects.extend(objs);
                    refs.type0
                },
            };
            resources.patch(&key, number)?;
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::test_fonts::hello_font;
    use crate::geometry::Point;
    use crate::writer::{FlateCompressor, SequentialIds};

    fn hello() -> Arc<TrueTypeFont> {
        Arc::new(TrueTypeFont::parse(hello_font()).unwrap())
    }

    fn text(s: &str, font: FontRef) -> TextOp {
        TextOp::new(s, Point::new(72.0, 700.0), font, 12.0)
    }

    #[test]
    fn test_base14_fonts() {
        assert_eq!(StandardFont::from_name("Helvetica"), Some(StandardFont::Helvetica));
        assert_eq!(StandardFont::from_name("Times-Roman"), Some(StandardFont::TimesRoman));
        assert_eq!(StandardFont::from_name("Courier-BoldOblique"), Some(StandardFont::CourierBoldOblique));
        assert_eq!(StandardFont::from_name("Arial"), None); // Not a Base-14 font
        assert!(StandardFont::Helvetica.uses_win_ansi());
        assert!(!StandardFont::Symbol.uses_win_ansi());
        for font in StandardFont::ALL {
            assert_eq!(StandardFont::from_name(font.name()), Some(font));
        }
    }

    #[test]
    fn test_scan_records_chars() {
        let mut fonts = FontCollection::new();
        fonts.add_font("body", hello());

        let graphics = vec![GraphicsOp::TextBlock {
            clip: None,
            text: vec![text("H", FontRef::custom("body"))],
        }];
        let runs = vec![text("i\ni", FontRef::custom("body")), text("x", FontRef::standard("Courier"))];
        fonts.scan(&graphics, &runs).unwrap();

        let used: Vec<char> = fonts.subset("body").unwrap().used_chars().iter().copied().collect();
        assert_eq!(used, vec!['H', 'i']);
    }

    #[test]
    fn test_scan_rejects_unknown_fonts() {
        let mut fonts = FontCollection::new();
        assert!(matches!(
            fonts.scan(&[], &[text("a", FontRef::custom("missing"))]),
            Err(Error::Font(_))
        ));
        assert!(matches!(
            fonts.scan(&[], &[text("a", FontRef::standard("Arial"))]),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn test_build_all_binds_built_subsets() {
        let mut fonts = FontCollection::new();
        fonts.add_font("body", hello());
        fonts
            .scan(&[], &[text("Hi", FontRef::custom("body")), text("x", FontRef::default())])
            .unwrap();

        let bound = fonts.build_all().unwrap();
        assert_eq!(bound.len(), 2);
        assert!(matches!(bound.get("std:Helvetica"), Some(BoundFont::Standard(StandardFont::Helvetica))));
        match bound.get("custom:body") {
            Some(BoundFont::Embedded(subset)) => assert_eq!(subset.encode_hex("Hi"), "<00010002>"),
            other => panic!("expected embedded font, got {:?}", other),
        }
    }

    #[test]
    fn test_write_fonts_patches_resources() {
        let mut fonts = FontCollection::new();
        fonts.add_font("body", hello());
        fonts
            .scan(&[], &[text("Hi", FontRef::custom("body")), text("x", FontRef::default())])
            .unwrap();
        let bound = fonts.build_all().unwrap();

        let mut resources = ResourceDictionary::new();
        resources.register("custom:body");
        resources.register("std:Helvetica");

        let mut ids = SequentialIds::new(10);
        let objects = bound
            .write_fonts(&mut resources, &mut ids, &FlateCompressor, &EmbedConfig::default())
            .unwrap();

        assert_eq!(objects.len(), 6);
        assert_eq!(resources.serialize().unwrap(), "<< /Font << /F1 10 0 R /F2 15 0 R >> >>");
    }

    #[test]
    fn test_write_fonts_unknown_key() {
        let mut fonts = FontCollection::new();
        let bound = fonts.build_all().unwrap();
        let mut resources = ResourceDictionary::new();
        resources.register("custom:ghost");

        let mut ids = SequentialIds::default();
        let result = bound.write_fonts(&mut resources, &mut ids, &FlateCompressor, &EmbedConfig::default());
        assert!(matches!(result, Err(Error::UnresolvedResource(_))));
    }
}
