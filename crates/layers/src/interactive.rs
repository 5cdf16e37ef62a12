use foundation::LayerId;
use serde::Serialize;
use tracing::debug;

use crate::binder::{RenderUnit, bound_layers};

/// Layer ids the renderer routes pointer events to.
///
/// Ids keep declaration order and appear once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InteractiveLayerSet {
    ids: Vec<LayerId>,
}

impl InteractiveLayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound layers whose metadata marks them interactive.
    pub fn from_units(units: &[RenderUnit]) -> Self {
        let mut out = Self::new();
        for layer in bound_layers(units).filter(|l| l.is_interactive()) {
            if !out.contains(layer.id.as_str()) {
                out.ids.push(layer.id.clone());
            }
        }
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|l| l.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerId> + '_ {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[LayerId] {
        &self.ids
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrarState {
    /// Renderer has not signalled that its sources and layers are mounted.
    #[default]
    Uninitialized,
    Ready,
}

/// Defers interactive-layer registration until the renderer has mounted.
///
/// Lifecycle:
/// - `reset` on every newly selected map definition: empty set, `Uninitialized`.
/// - `on_ready` once per mount: computes the set in one step, `Ready`.
/// - Further ready signals for the same mount are ignored.
#[derive(Debug, Clone, Default)]
pub struct InteractivityRegistrar {
    state: RegistrarState,
    interactive: InteractiveLayerSet,
}

impl InteractivityRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RegistrarState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RegistrarState::Ready
    }

    pub fn interactive(&self) -> &InteractiveLayerSet {
        &self.interactive
    }

    pub fn reset(&mut self) -> &InteractiveLayerSet {
        self.state = RegistrarState::Uninitialized;
        self.interactive = InteractiveLayerSet::new();
        &self.interactive
    }

    /// Returns the new set on the `Uninitialized -> Ready` transition only.
    pub fn on_ready(&mut self, units: &[RenderUnit]) -> Option<&InteractiveLayerSet> {
        if self.state == RegistrarState::Ready {
            debug!("ignoring repeated ready signal");
            return None;
        }
        self.interactive = InteractiveLayerSet::from_units(units);
        self.state = RegistrarState::Ready;
        debug!("{} interactive layers registered", self.interactive.len());
        Some(&self.interactive)
    }
}
