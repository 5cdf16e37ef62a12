use foundation::{LayerId, SourceId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One style layer of a project map, in renderer style-spec form.
///
/// `metadata` is free-form in the style spec; the map only looks at
/// `metadata.interactive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub id: LayerId,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Source-less layers (`background`, ...) have no binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Paint, layout, filter, zoom range and any other style properties.
    #[serde(flatten)]
    pub style: Map<String, Value>,
}

impl LayerDefinition {
    pub fn new(id: impl Into<LayerId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            source: None,
            metadata: None,
            style: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<SourceId>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: Value) -> Self {
        self.style.insert(key.into(), value);
        self
    }

    pub fn source_id(&self) -> Option<&SourceId> {
        self.source.as_ref()
    }

    /// True only for a literal boolean `true` at `metadata.interactive`.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.metadata.as_ref().and_then(|m| m.get("interactive")),
            Some(Value::Bool(true))
        )
    }

    /// Renderer payload for this layer. The `source` key is included when bound.
    pub fn render_spec(&self) -> Map<String, Value> {
        let mut out = Map::with_capacity(self.style.len() + 4);
        out.insert("id".to_string(), Value::String(self.id.to_string()));
        out.insert("type".to_string(), Value::String(self.kind.clone()));
        if let Some(source) = &self.source {
            out.insert("source".to_string(), Value::String(source.to_string()));
        }
        if let Some(metadata) = &self.metadata {
            out.insert("metadata".to_string(), metadata.clone());
        }
        for (k, v) in &self.style {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}
