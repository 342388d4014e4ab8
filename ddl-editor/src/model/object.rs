// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Database object records and typed handles

use super::cache::CacheRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Reserved property identifier mapped onto the object's name
pub const NAME_PROPERTY: &str = "name";

/// Identifier of an object inside an [`ObjectGraph`](super::ObjectGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object kinds known to the framework
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Database,
    Schema,
    Table,
    View,
    Column,
    Index,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Database => "database",
            ObjectKind::Schema => "schema",
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Column => "column",
            ObjectKind::Index => "index",
        };
        write!(f, "{}", s)
    }
}

impl TryFrom<&str> for ObjectKind {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "database" => Ok(ObjectKind::Database),
            "schema" => Ok(ObjectKind::Schema),
            "table" => Ok(ObjectKind::Table),
            "view" => Ok(ObjectKind::View),
            "column" => Ok(ObjectKind::Column),
            "index" => Ok(ObjectKind::Index),
            other => Err(format!("unknown object kind '{}'", other)),
        }
    }
}

/// Compile-time tag for an object kind.
///
/// Editors bind an object type and a container type through these markers so
/// that an editor for tables cannot be handed a schema as its target.
pub trait ObjectType: Send + Sync + 'static {
    const KIND: ObjectKind;
}

macro_rules! object_types {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub enum $name {}

            impl ObjectType for $name {
                const KIND: ObjectKind = ObjectKind::$kind;
            }
        )*
    };
}

object_types! {
    Database => Database,
    Schema => Schema,
    Table => Table,
    View => View,
    Column => Column,
    Index => Index,
}

/// Typed reference to an object of kind `T`
pub struct Handle<T: ObjectType> {
    id: ObjectId,
    _kind: PhantomData<fn() -> T>,
}

impl<T: ObjectType> Handle<T> {
    /// Callers must guarantee the object behind `id` is of kind `T`.
    /// Use [`ObjectGraph::handle`](super::ObjectGraph::handle) for a checked cast.
    pub(crate) fn new_unchecked(id: ObjectId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        T::KIND
    }
}

impl<T: ObjectType> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ObjectType> Copy for Handle<T> {}

impl<T: ObjectType> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ObjectType> Eq for Handle<T> {}

impl<T: ObjectType> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ObjectType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", T::KIND, self.id)
    }
}

impl<T: ObjectType> From<Handle<T>> for ObjectId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

/// In-memory record of one database object.
///
/// The framework treats objects as opaque: a name, a container, a persisted
/// flag and an open set of dialect-specific properties.
#[derive(Debug, Clone)]
pub struct DatabaseObject {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) name: String,
    pub(crate) container: Option<ObjectId>,
    pub(crate) persisted: bool,
    pub(crate) properties: BTreeMap<String, Value>,
    pub(crate) cache: Option<CacheRef>,
}

impl DatabaseObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> Option<ObjectId> {
        self.container
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Cache the object currently lives in, if any
    pub fn cache(&self) -> Option<&CacheRef> {
        self.cache.as_ref()
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Property value, `Value::Null` when unset. `name` reads the object name.
    pub fn property(&self, property: &str) -> Value {
        if property == NAME_PROPERTY {
            return Value::String(self.name.clone());
        }
        self.properties.get(property).cloned().unwrap_or(Value::Null)
    }

    /// String property, `None` when unset, null or not a string
    pub fn property_str(&self, property: &str) -> Option<&str> {
        if property == NAME_PROPERTY {
            return Some(&self.name);
        }
        self.properties.get(property).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_round_trip_through_str() {
        for kind in [
            ObjectKind::Database,
            ObjectKind::Schema,
            ObjectKind::Table,
            ObjectKind::View,
            ObjectKind::Column,
            ObjectKind::Index,
        ] {
            let text = kind.to_string();
            assert_eq!(ObjectKind::try_from(text.as_str()), Ok(kind));
        }
        assert!(ObjectKind::try_from("sequence").is_err());
    }

    #[test]
    fn test_handle_reports_marker_kind() {
        let handle: Handle<View> = Handle::new_unchecked(ObjectId(7));
        assert_eq!(handle.kind(), ObjectKind::View);
        assert_eq!(ObjectId::from(handle), ObjectId(7));
        assert_eq!(format!("{:?}", handle), "Handle<view>(#7)");
    }

    #[test]
    fn test_name_property_reads_object_name() {
        let object = DatabaseObject {
            id: ObjectId(1),
            kind: ObjectKind::View,
            name: "v1".to_string(),
            container: None,
            persisted: false,
            properties: BTreeMap::new(),
            cache: None,
        };
        assert_eq!(object.property(NAME_PROPERTY), Value::String("v1".into()));
        assert_eq!(object.property("source"), Value::Null);
        assert_eq!(object.property_str("source"), None);
    }
}
