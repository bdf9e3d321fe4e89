//! Property binding
//!
//! Properties are strings. The tree built from them is deserialized lazily:
//! a leaf is parsed only when the target asks for a number, a boolean or a
//! character, and is handed over verbatim when the target wants a string.

use serde::de::value::{Error, StrDeserializer};
use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, Unexpected, Visitor};
use serde::forward_to_deserialize_any;
use std::collections::{BTreeMap, btree_map};

/// A property value, or a group of properties sharing a dotted prefix
#[derive(Debug)]
pub(super) enum Node {
    Leaf(String),
    Group(BTreeMap<String, Node>),
}

impl Node {
    pub(super) fn group() -> Self {
        Node::Group(BTreeMap::new())
    }

    /// Place `value` at the dotted `path` below this group
    pub(super) fn insert(&mut self, path: &str, value: String) -> Result<(), String> {
        let Node::Group(children) = self else {
            return Err(format!("cannot place '{path}' below a value"));
        };
        match path.split_once('.') {
            None => {
                if matches!(children.get(path), Some(Node::Group(_))) {
                    return Err(format!("'{path}' is both a value and a group"));
                }
                children.insert(path.to_string(), Node::Leaf(value));
                Ok(())
            }
            Some((head, rest)) => {
                let child = children.entry(head.to_string()).or_insert_with(Node::group);
                if let Node::Leaf(_) = child {
                    return Err(format!("'{head}' is both a value and a group"));
                }
                child.insert(rest, value)
            }
        }
    }
}

/// Deserializes a [`Node`] tree
pub(super) struct NodeDeserializer<'a>(pub(super) &'a Node);

impl<'a> NodeDeserializer<'a> {
    fn leaf<'de, V: Visitor<'de>>(&self, visitor: &V) -> Result<&'a str, Error> {
        match self.0 {
            Node::Leaf(raw) => Ok(raw.as_str()),
            Node::Group(_) => Err(de::Error::invalid_type(Unexpected::Map, visitor)),
        }
    }
}

macro_rules! parse_leaf {
    ($($method:ident => $visit:ident),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            let raw = self.leaf(&visitor)?;
            match raw.trim().parse() {
                Ok(value) => visitor.$visit(value),
                Err(_) => Err(de::Error::invalid_value(Unexpected::Str(raw), &visitor)),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for NodeDeserializer<'de> {
    type Error = Error;

    /// Untyped targets get booleans and numbers where the text reads as one
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Node::Group(children) => visitor.visit_map(GroupAccess::new(children)),
            Node::Leaf(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Bool(b)) => visitor.visit_bool(b),
                Ok(serde_json::Value::Number(n)) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
                    (Some(u), _, _) => visitor.visit_u64(u),
                    (None, Some(i), _) => visitor.visit_i64(i),
                    (None, None, Some(f)) => visitor.visit_f64(f),
                    _ => visitor.visit_borrowed_str(raw),
                },
                _ => visitor.visit_borrowed_str(raw),
            },
        }
    }

    parse_leaf! {
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
        deserialize_char => visit_char,
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let raw = self.leaf(&visitor)?;
        visitor.visit_borrowed_str(raw)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    /// Unit variants, named by the leaf's text
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let raw = self.leaf(&visitor)?;
        let variant: StrDeserializer<'de, Error> = raw.into_deserializer();
        de::Deserializer::deserialize_enum(variant, name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct GroupAccess<'a> {
    entries: btree_map::Iter<'a, String, Node>,
    pending: Option<&'a Node>,
}

impl<'a> GroupAccess<'a> {
    fn new(children: &'a BTreeMap<String, Node>) -> Self {
        Self {
            entries: children.iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for GroupAccess<'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        let Some((key, node)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some(node);
        let key: StrDeserializer<'de, Error> = key.as_str().into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        let node = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("value requested before its key"))?;
        seed.deserialize(NodeDeserializer(node))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
