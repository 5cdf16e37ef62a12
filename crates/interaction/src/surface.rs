use foundation::{LayerId, ProjectMapId, Viewport};
use layers::{InteractiveLayerSet, RenderUnit};
use serde::{Deserialize, Serialize};

/// Cursor indicator shown over the map canvas.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value; the default indicator is the empty string.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionControl {
    pub position: ControlPosition,
    pub compact: bool,
}

/// On-map controls. The renderer's built-in attribution is always disabled;
/// `attribution` describes the one the map adds itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapControls {
    pub navigation: bool,
    pub show_compass: bool,
    pub fullscreen: bool,
    pub attribution: Option<AttributionControl>,
}

impl Default for MapControls {
    fn default() -> Self {
        Self {
            navigation: true,
            show_compass: false,
            fullscreen: true,
            attribution: Some(AttributionControl {
                position: ControlPosition::TopLeft,
                compact: true,
            }),
        }
    }
}

/// Everything a surface needs to mount one project map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapComposition {
    pub map_id: ProjectMapId,
    pub basemap_style: Option<String>,
    pub viewport: Viewport,
    pub controls: MapControls,
    pub units: Vec<RenderUnit>,
}

impl MapComposition {
    pub fn layer_ids(&self) -> impl Iterator<Item = &LayerId> + '_ {
        self.units.iter().flat_map(|u| u.layer_ids())
    }
}

/// Handle on the hosting map renderer.
///
/// The surface answers with `MapEvent`s: one `Ready` after each `mount`
/// (tagged with its `generation` when the host can), then
/// pointer events routed to the layers last passed to
/// `set_interactive_layers`. `unmount` removes the composition when the map
/// no longer resolves.
pub trait MapSurface {
    fn mount(&mut self, composition: &MapComposition, generation: u32);
    fn unmount(&mut self);
    fn set_interactive_layers(&mut self, layers: &InteractiveLayerSet);
    fn set_cursor(&mut self, cursor: Cursor);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Mount(ProjectMapId),
    Unmount,
    InteractiveLayers(Vec<LayerId>),
    Cursor(Cursor),
}

/// Headless surface that records every call it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub cursor: Cursor,
    pub interactive: Vec<LayerId>,
    pub mounted: Option<MapComposition>,
    pub generation: u32,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapSurface for RecordingSurface {
    fn mount(&mut self, composition: &MapComposition, generation: u32) {
        self.calls.push(SurfaceCall::Mount(composition.map_id.clone()));
        self.mounted = Some(composition.clone());
        self.generation = generation;
    }

    fn unmount(&mut self) {
        self.calls.push(SurfaceCall::Unmount);
        self.mounted = None;
        self.interactive.clear();
    }

    fn set_interactive_layers(&mut self, layers: &InteractiveLayerSet) {
        self.interactive = layers.as_slice().to_vec();
        self.calls
            .push(SurfaceCall::InteractiveLayers(self.interactive.clone()));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.calls.push(SurfaceCall::Cursor(cursor));
    }
}
