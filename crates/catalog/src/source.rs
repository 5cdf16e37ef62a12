use std::fmt;

use foundation::SourceId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A named dataset of a project, as stored in the project document.
///
/// `variables` and `timeSeries` annotate the data for the rest of the
/// application; they are not renderer parameters and never reach the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(
        default,
        rename = "timeSeries",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_series: Option<Value>,
    /// Renderer-specific configuration (`data`, `url`, `tiles`, `attribution`, ...).
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl SourceDefinition {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            variables: None,
            time_series: None,
            config: Map::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Renderer payload: `type` plus the renderer config, without domain annotations.
    pub fn render_spec(&self) -> Map<String, Value> {
        let mut out = Map::with_capacity(self.config.len() + 1);
        out.insert("type".to_string(), Value::String(self.kind.clone()));
        for (k, v) in &self.config {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}

/// Project sources keyed by id, in document order.
///
/// Document order is the order sources are handed to the renderer, so it is
/// preserved across (de)serialization. Re-inserting an existing id replaces the
/// definition in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    entries: Vec<(SourceId, SourceDefinition)>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SourceDefinition> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == id)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts or replaces `id`. Returns the previous definition, if any.
    pub fn insert(
        &mut self,
        id: impl Into<SourceId>,
        source: SourceDefinition,
    ) -> Option<SourceDefinition> {
        let id = id.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == id) {
            return Some(std::mem::replace(slot, source));
        }
        self.entries.push((id, source));
        None
    }

    pub fn remove(&mut self, id: &str) -> Option<SourceDefinition> {
        let idx = self.entries.iter().position(|(k, _)| k.as_str() == id)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &SourceDefinition)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &SourceId> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(SourceId, SourceDefinition)> for SourceMap {
    fn from_iter<T: IntoIterator<Item = (SourceId, SourceDefinition)>>(iter: T) -> Self {
        let mut out = SourceMap::new();
        for (id, source) in iter {
            out.insert(id, source);
        }
        out
    }
}

impl Serialize for SourceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, source) in &self.entries {
            map.serialize_entry(id, source)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SourceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourceMapVisitor;

        impl<'de> Visitor<'de> for SourceMapVisitor {
            type Value = SourceMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of source id to source definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SourceMap, A::Error> {
                let mut out = SourceMap::new();
                while let Some((id, source)) =
                    access.next_entry::<SourceId, SourceDefinition>()?
                {
                    out.insert(id, source);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(SourceMapVisitor)
    }
}
