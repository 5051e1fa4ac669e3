//! PDF object serialization.
//!
//! Byte-exact object syntax (ISO 32000-1:2008, 7.3) for the objects this
//! crate writes: font dictionaries, CMap and font program streams, and
//! references between them. Dictionary keys are written in sorted order so
//! the same input always yields the same bytes.

use crate::object::{IndirectObject, Object, ObjectRef};
use std::collections::HashMap;
use std::io::Write;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer {
    /// Write dictionaries on one line
    compact: bool,
}

impl ObjectSerializer {
    /// Serializer writing one dictionary entry per line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer writing dictionaries on a single line.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writes into a Vec cannot fail
        let _ = self.write_object(&mut buf, obj);
        buf
    }

    /// Serialize an object to a string, replacing non-UTF-8 stream bytes.
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).into_owned()
    }

    /// Serialize `obj` as the body of indirect object `number`.
    pub fn indirect(&self, number: u32, obj: &Object) -> IndirectObject {
        IndirectObject::new(number, self.serialize(obj))
    }

    fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => w.write_all(b"null"),
            Object::Boolean(b) => write!(w, "{}", b),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => w.write_all(format_real(*r).as_bytes()),
            Object::String(s) => write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(items) => {
                w.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.write_all(b" ")?;
                    }
                    self.write_object(w, item)?;
                }
                w.write_all(b"]")
            },
            Object::Dictionary(dict) => self.write_dictionary(w, dict, None),
            Object::Stream { dict, data } => {
                // An explicit /Length wins over the payload size
                let length = (!dict.contains_key("Length")).then_some(data.len());
                self.write_dictionary(w, dict, length)?;
                w.write_all(b"\nstream\n")?;
                w.write_all(data)?;
                w.write_all(b"\nendstream")
            },
            Object::Reference(ObjectRef { id, gen }) => write!(w, "{} {} R", id, gen),
        }
    }

    /// Write `dict`, adding `/Length` when `length` is set.
    fn write_dictionary<W: Write>(
        &self,
        w: &mut W,
        dict: &HashMap<String, Object>,
        length: Option<usize>,
    ) -> std::io::Result<()> {
        let length_entry = length.map(|len| Object::Integer(len as i64));
        let mut entries: Vec<(&str, &Object)> =
            dict.iter().map(|(k, v)| (k.as_str(), v)).collect();
        if let Some(entry) = &length_entry {
            entries.push(("Length", entry));
        }
        entries.sort_by_key(|(key, _)| *key);

        w.write_all(b"<<")?;
        for (key, value) in &entries {
            if !self.compact {
                w.write_all(b"\n  ")?;
            }
            write_name(w, key)?;
            w.write_all(b" ")?;
            self.write_object(w, value)?;
        }
        if !self.compact && !entries.is_empty() {
            w.write_all(b"\n")?;
        }
        w.write_all(b">>")
    }
}

/// Real with at most five decimals and no trailing zeros.
fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let s = format!("{:.5}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Literal string for printable ASCII, hex string otherwise.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    let literal = data
        .iter()
        .all(|&b| matches!(b, b'\n' | b'\r' | b'\t' | 0x20..=0x7E));
    if !literal {
        w.write_all(b"<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        return w.write_all(b">");
    }

    w.write_all(b"(")?;
    for &byte in data {
        match byte {
            b'(' | b')' | b'\\' => w.write_all(&[b'\\', byte])?,
            b'\n' => w.write_all(b"\\n")?,
            b'\r' => w.write_all(b"\\r")?,
            b'\t' => w.write_all(b"\\t")?,
            _ => w.write_all(&[byte])?,
        }
    }
    w.write_all(b")")
}

/// `/Name`, with delimiters, whitespace and non-ASCII bytes as `#xx`.
fn write_name<W: Write>(w: &mut W, name: &str) -> std::io::Result<()> {
    w.write_all(b"/")?;
    for byte in name.bytes() {
        let regular = (0x21..=0x7E).contains(&byte)
            && !matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#');
        if regular {
            w.write_all(&[byte])?;
        } else {
            write!(w, "#{:02X}", byte)?;
        }
    }
    Ok(())
}

/// Constructors for the objects font and page writers build.
impl ObjectSerializer {
    /// Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// String object holding the bytes of `s`.
    pub fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec())
    }

    /// Integer object.
    pub fn integer(i: i64) -> Object {
        Object::Integer(i)
    }

    /// Array object.
    pub fn array(items: Vec<Object>) -> Object {
        Object::Array(items)
    }

    /// Dictionary object from `(key, value)` pairs.
    pub fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(into_map(entries))
    }

    /// Reference to object `id`.
    pub fn reference(id: u32, gen: u16) -> Object {
        Object::Reference(ObjectRef::new(id, gen))
    }

    /// Stream object from dictionary entries and already-encoded data.
    ///
    /// `/Length` is filled in at serialization time.
    pub fn stream(entries: Vec<(&str, Object)>, data: impl Into<bytes::Bytes>) -> Object {
        Object::Stream {
            dict: into_map(entries),
            data: data.into(),
        }
    }

    /// Array of integers.
    pub fn int_array(values: impl IntoIterator<Item = i64>) -> Object {
        Object::Array(values.into_iter().map(Object::Integer).collect())
    }
}

fn into_map(entries: Vec<(&str, Object)>) -> HashMap<String, Object> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(obj: &Object) -> String {
        ObjectSerializer::compact().serialize_to_string(obj)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(compact(&Object::Null), "null");
        assert_eq!(compact(&Object::Boolean(true)), "true");
        assert_eq!(compact(&Object::Integer(-200)), "-200");
        assert_eq!(compact(&Object::Reference(ObjectRef::new(10, 0))), "10 0 R");
    }

    #[test]
    fn test_reals() {
        assert_eq!(compact(&Object::Real(0.0)), "0");
        assert_eq!(compact(&Object::Real(-12.5)), "-12.5");
        assert_eq!(compact(&Object::Real(3.141_592_6)), "3.14159");
        assert_eq!(compact(&Object::Real(-0.000_001)), "0");
        assert_eq!(compact(&Object::Real(f64::NAN)), "0");
    }

    #[test]
    fn test_strings() {
        assert_eq!(compact(&ObjectSerializer::string("Adobe")), "(Adobe)");
        assert_eq!(compact(&ObjectSerializer::string("a(b)\\")), "(a\\(b\\)\\\\)");
        assert_eq!(compact(&Object::String(vec![0x00, 0xFF, 0x80])), "<00FF80>");
    }

    #[test]
    fn test_names() {
        assert_eq!(compact(&ObjectSerializer::name("Identity-H")), "/Identity-H");
        assert_eq!(compact(&ObjectSerializer::name("ABCDEF+Test Sans")), "/ABCDEF+Test#20Sans");
        assert_eq!(compact(&ObjectSerializer::name("a/b#c")), "/a#2Fb#23c");
    }

    #[test]
    fn test_widths_array() {
        let w = ObjectSerializer::array(vec![
            ObjectSerializer::integer(1),
            ObjectSerializer::int_array([700, 300]),
        ]);
        assert_eq!(compact(&w), "[1 [700 300]]");
    }

    #[test]
    fn test_compact_dictionary_sorted() {
        let dict = ObjectSerializer::dict(vec![
            ("Subtype", ObjectSerializer::name("Type0")),
            ("DescendantFonts", ObjectSerializer::array(vec![ObjectSerializer::reference(5, 0)])),
            ("Encoding", ObjectSerializer::name("Identity-H")),
        ]);
        assert_eq!(
            compact(&dict),
            "<</DescendantFonts [5 0 R]/Encoding /Identity-H/Subtype /Type0>>"
        );
    }

    #[test]
    fn test_pretty_dictionary_sorted() {
        let dict = ObjectSerializer::dict(vec![
            ("Subtype", ObjectSerializer::name("Type0")),
            ("BaseFont", ObjectSerializer::name("ABCDEF+TestSans")),
        ]);
        assert_eq!(
            ObjectSerializer::new().serialize_to_string(&dict),
            "<<\n  /BaseFont /ABCDEF+TestSans\n  /Subtype /Type0\n>>"
        );
        assert_eq!(ObjectSerializer::new().serialize_to_string(&ObjectSerializer::dict(vec![])), "<<>>");
    }

    #[test]
    fn test_stream_length_added_in_key_order() {
        let stream = ObjectSerializer::stream(
            vec![
                ("Filter", ObjectSerializer::name("FlateDecode")),
                ("Length1", ObjectSerializer::integer(2048)),
            ],
            b"abc".to_vec(),
        );
        assert_eq!(
            compact(&stream),
            "<</Filter /FlateDecode/Length 3/Length1 2048>>\nstream\nabc\nendstream"
        );
    }

    #[test]
    fn test_stream_explicit_length_kept() {
        let stream = ObjectSerializer::stream(vec![("Length", ObjectSerializer::integer(99))], b"ab".to_vec());
        assert_eq!(compact(&stream), "<</Length 99>>\nstream\nab\nendstream");
    }

    #[test]
    fn test_indirect_object() {
        let obj = ObjectSerializer::compact().indirect(12, &ObjectSerializer::int_array([0, 500, 1000]));
        assert_eq!(obj.reference(), ObjectRef::new(12, 0));
        assert_eq!(obj.to_bytes(), b"12 0 obj\n[0 500 1000]\nendobj\n".to_vec());
    }
}
