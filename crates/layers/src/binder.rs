use catalog::{LayerDefinition, SourceMap};
use foundation::{LayerId, SourceId};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// One source as registered with the renderer, with the layers drawn from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderUnit {
    pub id: SourceId,
    /// Renderer payload; domain annotations are already stripped.
    pub source: Map<String, Value>,
    /// Declaration order, i.e. draw order within the source.
    pub layers: Vec<LayerDefinition>,
}

impl RenderUnit {
    pub fn layer_ids(&self) -> impl Iterator<Item = &LayerId> + '_ {
        self.layers.iter().map(|l| &l.id)
    }
}

/// Pairs sources with the layers that reference them.
///
/// Ordering contract:
/// - Units follow source order; layers within a unit follow declaration order.
///
/// Sources no layer references produce no unit. Layers pointing at a missing
/// source, and source-less layers, are never bound.
pub fn bind(sources: &SourceMap, layers: &[LayerDefinition]) -> Vec<RenderUnit> {
    let mut out = Vec::new();

    for (id, source) in sources.iter() {
        let bound: Vec<LayerDefinition> = layers
            .iter()
            .filter(|l| l.source_id() == Some(id))
            .cloned()
            .collect();
        if bound.is_empty() {
            debug!("source {id} has no layers; not registering it");
            continue;
        }
        out.push(RenderUnit {
            id: id.clone(),
            source: source.render_spec(),
            layers: bound,
        });
    }

    for layer in layers {
        if let Some(source) = layer.source_id()
            && !sources.contains(source.as_str())
        {
            debug!("layer {} references missing source {source}", layer.id);
        }
    }

    out
}

/// All bound layers across units, in unit then declaration order.
pub fn bound_layers(units: &[RenderUnit]) -> impl Iterator<Item = &LayerDefinition> + '_ {
    units.iter().flat_map(|u| u.layers.iter())
}
