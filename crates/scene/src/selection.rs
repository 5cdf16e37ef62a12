use foundation::{LayerId, SourceId};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::components::{VectorGeometry, decode_properties};
use crate::feature::MapFeature;

/// The clicked feature with structured property values decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    pub geometry: Option<VectorGeometry>,
    pub properties: Map<String, Value>,
}

impl From<MapFeature> for SelectedFeature {
    fn from(feature: MapFeature) -> Self {
        Self {
            id: feature.id,
            layer: feature.layer,
            source: feature.source,
            source_layer: feature.source_layer,
            geometry: feature.geometry,
            properties: decode_properties(feature.properties),
        }
    }
}

/// Single-feature selection driven by pointer clicks.
///
/// Every click overwrites the selection: a click with hits selects the
/// top-most one, a click without hits clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSelector {
    selected: Option<SelectedFeature>,
}

impl FeatureSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_click<I>(&mut self, hits: I) -> Option<&SelectedFeature>
    where
        I: IntoIterator<Item = MapFeature>,
    {
        self.selected = hits.into_iter().next().map(SelectedFeature::from);
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&SelectedFeature> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
