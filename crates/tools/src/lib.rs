use std::fs;
use std::path::Path;

use catalog::{CatalogError, Project};
use foundation::{LayerId, LngLatBounds, ProjectMapId, Viewport};
use interaction::{
    Cursor, EngineConfig, FeatureDataPanel, MapComposition, MapEvent, MapView, ProjectMapEngine,
    RecordingSurface,
};
use layers::RegistrarState;
use runtime::{EventQueue, QueuedEvent};
use scene::SelectedFeature;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Map instance id used by every engine the CLI creates.
pub const CLI_MAP_INSTANCE: &str = "lasso-map";

#[derive(Debug)]
pub enum ToolError {
    Io { path: String, message: String },
    Catalog(CatalogError),
    MapNotFound { project: String, map: String },
    Events(String),
    InvalidArg(String),
    Output(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            ToolError::Catalog(err) => write!(f, "{err}"),
            ToolError::MapNotFound { project, map } => {
                write!(f, "project {project} has no map {map:?}")
            }
            ToolError::Events(msg) => write!(f, "invalid event script: {msg}"),
            ToolError::InvalidArg(msg) => write!(f, "invalid argument: {msg}"),
            ToolError::Output(msg) => write!(f, "cannot write output: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<CatalogError> for ToolError {
    fn from(err: CatalogError) -> Self {
        ToolError::Catalog(err)
    }
}

fn read_file(path: &Path) -> Result<String, ToolError> {
    fs::read_to_string(path).map_err(|e| ToolError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn read_project(path: &Path) -> Result<Project, ToolError> {
    let raw = read_file(path)?;
    Ok(Project::from_json_str(&raw)?)
}

pub fn read_events(path: &Path) -> Result<Vec<MapEvent>, ToolError> {
    parse_events(&read_file(path)?)
}

/// Parses a JSON array of map events (`{"event": "click", "features": [...]}`).
pub fn parse_events(raw: &str) -> Result<Vec<MapEvent>, ToolError> {
    serde_json::from_str(raw).map_err(|e| ToolError::Events(e.to_string()))
}

/// `west,south,east,north`
pub fn parse_bounds(raw: &str) -> Result<LngLatBounds, ToolError> {
    let parts = parse_numbers(raw, 4)?;
    let bounds = LngLatBounds::new([parts[0], parts[1]], [parts[2], parts[3]]);
    if !bounds.is_finite() {
        return Err(ToolError::InvalidArg(format!("bounds {raw:?} are not finite")));
    }
    Ok(bounds)
}

/// `lat,lon`
pub fn parse_center(raw: &str) -> Result<[f64; 2], ToolError> {
    let parts = parse_numbers(raw, 2)?;
    if !parts.iter().all(|v| v.is_finite()) {
        return Err(ToolError::InvalidArg(format!("center {raw:?} is not finite")));
    }
    Ok([parts[0], parts[1]])
}

fn parse_numbers(raw: &str, expected: usize) -> Result<Vec<f64>, ToolError> {
    let parts = raw
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| ToolError::InvalidArg(format!("{p:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() != expected {
        return Err(ToolError::InvalidArg(format!(
            "expected {expected} comma-separated numbers, got {raw:?}"
        )));
    }
    Ok(parts)
}

/// Collects every panel update of a replay.
#[derive(Debug, Default)]
pub struct RecordingPanel {
    pub renders: Vec<Option<SelectedFeature>>,
}

impl FeatureDataPanel for RecordingPanel {
    fn render(&mut self, feature: Option<&SelectedFeature>, _project: &Project) {
        self.renders.push(feature.cloned());
    }
}

type CliEngine = ProjectMapEngine<RecordingSurface, RecordingPanel>;

fn resolve_engine(
    project: Project,
    map: &str,
    viewport: Viewport,
) -> Result<CliEngine, ToolError> {
    let project_id = project.id.to_string();
    let config = EngineConfig::new(CLI_MAP_INSTANCE).with_viewport(viewport);
    let mut engine = ProjectMapEngine::new(config, RecordingPanel::default());
    engine.show(Some(project), Some(ProjectMapId::from(map)));
    if engine.view() == MapView::Loading {
        return Err(ToolError::MapNotFound {
            project: project_id,
            map: map.to_string(),
        });
    }
    Ok(engine)
}

/// Binds the sources and layers of `map` without mounting anything.
pub fn compose(project: Project, map: &str, viewport: Viewport) -> Result<MapComposition, ToolError> {
    let engine = resolve_engine(project, map, viewport)?;
    match engine.view() {
        MapView::Composed(composition) => Ok(composition.clone()),
        MapView::Loading => Err(ToolError::InvalidArg(format!("map {map:?} did not resolve"))),
    }
}

/// Interactive layer ids of `map` once its renderer has signalled ready.
pub fn interactive_layers(project: Project, map: &str) -> Result<Vec<LayerId>, ToolError> {
    let mut engine = resolve_engine(project, map, Viewport::Auto)?;
    engine.on_ready();
    Ok(engine.interactive_layers().as_slice().to_vec())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub seq: usize,
    pub event: &'static str,
    pub registrar: RegistrarState,
    pub cursor: Cursor,
    pub selected: Option<SelectedFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub map_id: ProjectMapId,
    pub steps: Vec<ReplayStep>,
    pub interactive_layers: Vec<LayerId>,
    pub panel_updates: usize,
    pub surface_calls: usize,
}

/// Mounts `map` on a recording surface and feeds it `events` in order.
pub fn replay(project: Project, map: &str, events: Vec<MapEvent>) -> Result<ReplayReport, ToolError> {
    let mut engine = resolve_engine(project, map, Viewport::Auto)?;
    engine.attach_surface(RecordingSurface::new());

    let mut queue = EventQueue::new();
    for event in events {
        queue.push(event);
    }

    let mut steps = Vec::with_capacity(queue.len());
    let processed = queue.run(|event| {
        let kind = event.kind();
        engine.handle(event);
        steps.push(ReplayStep {
            seq: steps.len(),
            event: kind,
            registrar: engine.registrar_state(),
            cursor: engine.cursor(),
            selected: engine.selected().cloned(),
        });
    });
    debug!("replayed {processed} events on map {map}");

    Ok(ReplayReport {
        map_id: ProjectMapId::from(map),
        steps,
        interactive_layers: engine.interactive_layers().as_slice().to_vec(),
        panel_updates: engine.panel().renders.len(),
        surface_calls: engine.surface().map_or(0, |s| s.calls.len()),
    })
}

/// Decodes a single property value the way selected features decode them.
///
/// `raw` is tried as JSON first so numbers and booleans stay typed; anything
/// else is treated as a plain string.
pub fn decode(raw: &str) -> Value {
    let value = serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|v| !v.is_object())
        .unwrap_or_else(|| Value::String(raw.to_string()));
    scene::components::decode_value(value)
}
