//! Page resource dictionary.
//!
//! Content streams name fonts (`/F1 12 Tf`); the page's `/Resources`
//! dictionary binds those names to font objects. Names are handed out while
//! rendering and bound to object numbers once the fonts are written.

use crate::error::{Error, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FontEntry {
    name: String,
    object: Option<u32>,
}

/// Font resources of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDictionary {
    /// Logical key (`std:Helvetica`, `custom:body`) -> entry, in registration order
    fonts: IndexMap<String, FontEntry>,
}

impl ResourceDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for `key`, assigning the next `F{n}` on first use.
    pub fn register(&mut self, key: &str) -> String {
        if let Some(entry) = self.fonts.get(key) {
            return entry.name.clone();
        }
        let name = format!("F{}", self.fonts.len() + 1);
        self.fonts.insert(
            key.to_string(),
            FontEntry {
                name: name.clone(),
                object: None,
            },
        );
        name
    }

    /// Resource name of a registered key.
    pub fn resource_name(&self, key: &str) -> Option<&str> {
        self.fonts.get(key).map(|entry| entry.name.as_str())
    }

    /// Bind a registered key to its font object.
    pub fn patch(&mut self, key: &str, object_number: u32) -> Result<()> {
        let entry = self
            .fonts
            .get_mut(key)
            .ok_or_else(|| Error::UnresolvedResource(key.to_string()))?;
        entry.object = Some(object_number);
        Ok(())
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Object number bound to a key.
    pub fn object_number(&self, key: &str) -> Option<u32> {
        self.fonts.get(key).and_then(|entry| entry.object)
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Serialize as `<< /Font << /F1 12 0 R ... >> >>`.
    ///
    /// Fails if any registered key was never patched.
    pub fn serialize(&self) -> Result<String> {
        let mut out = String::from("<< /Font <<");
        for (key, entry) in &self.fonts {
            let object = entry
                .object
                .ok_or_else(|| Error::UnresolvedResource(key.clone()))?;
            out.push_str(&format!(" /{} {} 0 R", entry.name, object));
        }
        out.push_str(" >> >>");
        Ok(out)
    }
}
