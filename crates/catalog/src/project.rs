use foundation::{ProjectId, ProjectMapId};
use serde::{Deserialize, Serialize};

use crate::CatalogError;
use crate::layer::LayerDefinition;
use crate::source::SourceMap;

/// A project as materialized by the application: its datasets and the maps
/// composed from them. Fields the map does not use are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub sources: SourceMap,
    #[serde(default)]
    pub maps: Vec<ProjectMapDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMapDefinition {
    pub id: ProjectMapId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Style document url for the basemap drawn under the project layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basemap_style: Option<String>,
    /// Draw order: later layers draw on top.
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
}

impl Project {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            sources: SourceMap::new(),
            maps: Vec::new(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(raw).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    pub fn from_json_slice(raw: &[u8]) -> Result<Self, CatalogError> {
        serde_json::from_slice(raw).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    pub fn find_map(&self, id: &str) -> Option<&ProjectMapDefinition> {
        self.maps.iter().find(|m| m.id.as_str() == id)
    }
}

impl ProjectMapDefinition {
    pub fn new(id: impl Into<ProjectMapId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            basemap_style: None,
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerDefinition) -> Self {
        self.layers.push(layer);
        self
    }
}
