use runtime::QueuedEvent;
use scene::MapFeature;
use serde::{Deserialize, Serialize};

/// Callbacks a mounted surface delivers to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum MapEvent {
    /// The surface has registered every source and layer of the current mount.
    Ready,
    /// Hit-test result of a click, top-most first; empty on a miss.
    Click {
        #[serde(default)]
        features: Vec<MapFeature>,
    },
    PointerEnter {
        #[serde(default)]
        features: Option<Vec<MapFeature>>,
    },
    PointerLeave,
}

impl QueuedEvent for MapEvent {
    fn kind(&self) -> &'static str {
        match self {
            MapEvent::Ready => "ready",
            MapEvent::Click { .. } => "click",
            MapEvent::PointerEnter { .. } => "pointer_enter",
            MapEvent::PointerLeave => "pointer_leave",
        }
    }
}
