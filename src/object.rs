//! Write-side PDF objects.
//!
//! Font and page writers assemble [`Object`] trees, the
//! [`ObjectSerializer`](crate::writer::ObjectSerializer) turns them into
//! bytes, and the result leaves the crate as numbered [`IndirectObject`]s.

use std::collections::HashMap;
use std::fmt;

/// A PDF object value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Integer number
    Integer(i64),
    /// Real number
    Real(f64),
    /// Raw string bytes
    String(Vec<u8>),
    /// Name, stored without the leading slash
    Name(String),
    /// Array
    Array(Vec<Object>),
    /// Dictionary
    Dictionary(HashMap<String, Object>),
    /// Stream. `/Length` is derived from `data` unless present in `dict`.
    Stream {
        /// Stream dictionary
        dict: HashMap<String, Object>,
        /// Payload, already encoded with the filters named in `dict`
        data: bytes::Bytes,
    },
    /// `id gen R`
    Reference(ObjectRef),
}

impl Object {
    /// Integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Object::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Array items, if this is an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        if let Object::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Name without its slash, if this is a name.
    pub fn as_name(&self) -> Option<&str> {
        if let Object::Name(name) = self {
            Some(name)
        } else {
            None
        }
    }

    /// Target of an indirect reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(target) => Some(*target),
            _ => None,
        }
    }

    /// Dictionary entries of a dictionary or stream.
    pub fn as_dict(&self) -> Option<&HashMap<String, Object>> {
        match self {
            Object::Dictionary(dict) | Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }
}

/// Object number and generation of an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Reference to object `id` at generation `gen`.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

/// A serialized object body with its number, ready for the xref writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectObject {
    /// Object number
    pub number: u32,
    /// Generation number, always 0 for freshly written objects
    pub generation: u16,
    /// Object body without the `obj`/`endobj` wrapper
    pub data: Vec<u8>,
}

impl IndirectObject {
    /// Indirect object `number` at generation 0.
    pub fn new(number: u32, data: Vec<u8>) -> Self {
        Self {
            number,
            generation: 0,
            data,
        }
    }

    /// Reference pointing at this object.
    pub fn reference(&self) -> ObjectRef {
        ObjectRef::new(self.number, self.generation)
    }

    /// `N G obj`, the body, then `endobj`, each on its own line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} obj\n", self.number, self.generation).into_bytes();
        out.extend_from_slice(&self.data);
        out.extend_from_slice(b"\nendobj\n");
        out
    }
}
