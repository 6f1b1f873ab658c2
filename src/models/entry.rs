//! CWE entries and the collections upstream returns them in.
//!
//! Entries are opaque: the upstream JSON object is kept as-is and only a few
//! well-known fields are read back out (for keyword matching).

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::{CweId, Identifier, ViewFilter};

/// One upstream record (weakness, category, view or summary), passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CweEntry(Map<String, Value>);

impl CweEntry {
    /// Upstream `ID`, which MITRE sends as a string.
    pub fn id(&self) -> Option<&str> {
        self.str_field("ID")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("Name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("Description")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for CweEntry {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

/// Upstream collection families served by the batch lookup endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Weaknesses,
    Categories,
    Views,
}

impl Collection {
    /// Key the upstream wraps the entries in.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Weaknesses => "Weaknesses",
            Collection::Categories => "Categories",
            Collection::Views => "Views",
        }
    }

    /// Path segment under `cwe/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Collection::Weaknesses => "weakness",
            Collection::Categories => "category",
            Collection::Views => "view",
        }
    }

    /// Operation name used in errors and logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Collection::Weaknesses => "get_weakness",
            Collection::Categories => "get_category",
            Collection::Views => "get_view",
        }
    }
}

/// Entries of one collection in upstream order.
///
/// Serializes the way MITRE does: `{"Weaknesses": [...]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryListing {
    pub collection: Collection,
    pub entries: Vec<CweEntry>,
}

impl EntryListing {
    pub fn empty(collection: Collection) -> Self {
        Self {
            collection,
            entries: Vec::new(),
        }
    }
}

impl Serialize for EntryListing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.collection.key(), &self.entries)?;
        map.end()
    }
}

/// Summary lookups keyed by the identifier that was asked for.
///
/// Keys keep the caller's order; each value is the upstream payload for
/// that identifier (an empty array when upstream does not know it).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CweInfo {
    pub entries: Vec<(Identifier, Value)>,
}

impl CweInfo {
    pub fn get(&self, identifier: &Identifier) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == identifier)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.get(identifier).is_some()
    }
}

impl Serialize for CweInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (identifier, value) in &self.entries {
            map.serialize_entry(&identifier.to_string(), value)?;
        }
        map.end()
    }
}

/// Hierarchy directions available for a single weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Parents,
    Children,
    Ancestors,
    Descendants,
}

impl Relation {
    /// Key used in responses (and by upstream when it wraps the array).
    pub fn key(&self) -> &'static str {
        match self {
            Relation::Parents => "Parents",
            Relation::Children => "Children",
            Relation::Ancestors => "Ancestors",
            Relation::Descendants => "Descendants",
        }
    }

    /// Trailing path segment: `cwe/{id}/{segment}`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Relation::Parents => "parents",
            Relation::Children => "children",
            Relation::Ancestors => "ancestors",
            Relation::Descendants => "descendants",
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Relation::Parents => "get_parents",
            Relation::Children => "get_children",
            Relation::Ancestors => "get_ancestors",
            Relation::Descendants => "get_descendants",
        }
    }
}

/// Related entries of one weakness, optionally restricted to a view.
///
/// Entries stay raw JSON: ancestor and descendant trees nest arbitrarily.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    pub relation: Relation,
    pub cwe_id: CweId,
    pub view: Option<ViewFilter>,
    pub entries: Vec<Value>,
}

impl Serialize for Hierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.view.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("cwe_id", &self.cwe_id)?;
        if let Some(view) = &self.view {
            map.serialize_entry("view", view)?;
        }
        map.serialize_entry(self.relation.key(), &self.entries)?;
        map.end()
    }
}
