use foundation::{LayerId, SourceId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::components::VectorGeometry;

/// A feature reported by a renderer hit-test, properties still raw.
///
/// Accepts the renderer's own feature shape: `layer` may be the full style
/// layer object, `geometry` may be a kind this crate does not model (kept as
/// `None`) and `properties` may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFeature {
    /// Feature id as provided by the source (number or string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Style layer the hit was rendered by.
    #[serde(
        default,
        deserialize_with = "layer_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub layer: Option<LayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<VectorGeometry>,
    #[serde(default, deserialize_with = "nullable_properties")]
    pub properties: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayerRef {
    Id(LayerId),
    Style { id: LayerId },
}

fn layer_ref<'de, D: Deserializer<'de>>(d: D) -> Result<Option<LayerId>, D::Error> {
    Ok(Option::<LayerRef>::deserialize(d)?.map(|r| match r {
        LayerRef::Id(id) | LayerRef::Style { id } => id,
    }))
}

fn lenient_geometry<'de, D: Deserializer<'de>>(d: D) -> Result<Option<VectorGeometry>, D::Error> {
    let Some(raw) = Option::<Value>::deserialize(d)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(geometry) => Ok(Some(geometry)),
        Err(err) => {
            trace!("dropping unsupported hit geometry: {err}");
            Ok(None)
        }
    }
}

fn nullable_properties<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(d)?.unwrap_or_default())
}

impl MapFeature {
    pub fn new(layer: impl Into<LayerId>) -> Self {
        Self {
            layer: Some(layer.into()),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_geometry(mut self, geometry: VectorGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}
