use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use catalog::{InMemoryProjectStore, Project, ProjectStore};
use foundation::{LngLatBounds, ProjectId, Viewport};
use interaction::{
    Cursor, EngineConfig, FeatureDataPanel, MapComposition, MapSurface, MapView, ProjectMapEngine,
};
use layers::InteractiveLayerSet;
use scene::{MapFeature, SelectedFeature};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

// JS callbacks may call back into this module, so nothing is delivered while
// map state is borrowed. Surfaces and panels queue messages here instead.
#[derive(Debug)]
enum Outbound {
    /// Composition JSON and the mount generation `map_ready` must echo back.
    Mount(String, u32),
    Unmount,
    Interactive(Vec<String>),
    Selection(Option<String>),
}

#[derive(Debug, Default)]
struct CanvasSurface {
    canvas: Option<HtmlCanvasElement>,
    outbox: Vec<Outbound>,
}

impl MapSurface for CanvasSurface {
    fn mount(&mut self, composition: &MapComposition, generation: u32) {
        match serde_json::to_string(composition) {
            Ok(json) => self.outbox.push(Outbound::Mount(json, generation)),
            Err(e) => log_error(&format!("composition encode failed: {e}")),
        }
    }

    fn unmount(&mut self) {
        self.outbox.push(Outbound::Unmount);
    }

    fn set_interactive_layers(&mut self, layers: &InteractiveLayerSet) {
        let ids = layers.iter().map(|l| l.to_string()).collect();
        self.outbox.push(Outbound::Interactive(ids));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        let Some(canvas) = &self.canvas else {
            return;
        };
        if let Err(e) = canvas.style().set_property("cursor", cursor.as_css()) {
            log_error(&format!("cursor update failed: {e:?}"));
        }
    }
}

#[derive(Debug, Default)]
struct OutboxPanel {
    outbox: Vec<Outbound>,
}

impl FeatureDataPanel for OutboxPanel {
    fn render(&mut self, feature: Option<&SelectedFeature>, _project: &Project) {
        let json = match feature.map(serde_json::to_string).transpose() {
            Ok(json) => json,
            Err(e) => {
                log_error(&format!("feature encode failed: {e}"));
                None
            }
        };
        self.outbox.push(Outbound::Selection(json));
    }
}

#[derive(Debug, Default, Clone)]
struct Callbacks {
    on_mount: Option<js_sys::Function>,
    on_unmount: Option<js_sys::Function>,
    on_interactive: Option<js_sys::Function>,
    on_select: Option<js_sys::Function>,
}

struct WebMap {
    engine: ProjectMapEngine<CanvasSurface, OutboxPanel>,
    project_id: Option<ProjectId>,
    callbacks: Callbacks,
}

thread_local! {
    static PROJECTS: RefCell<InMemoryProjectStore> = RefCell::new(InMemoryProjectStore::new());
    static MAPS: RefCell<BTreeMap<String, WebMap>> = const { RefCell::new(BTreeMap::new()) };
}

#[derive(Debug, Default, Deserialize)]
struct MapOptions {
    #[serde(default)]
    bounds: Option<LngLatBounds>,
    /// `[lat, lon]`
    #[serde(default)]
    center: Option<[f64; 2]>,
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn log_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn js_err(msg: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

/// Runs `f` against one map, then delivers whatever it queued for JS.
fn with_map<F, R>(map_instance: &str, f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut WebMap) -> R,
{
    let (out, callbacks, outbox) = MAPS
        .try_with(|maps| {
            let mut maps = maps.borrow_mut();
            let map = maps
                .get_mut(map_instance)
                .ok_or_else(|| js_err(format!("unknown map instance: {map_instance}")))?;
            let out = f(map);
            let mut outbox = map
                .engine
                .surface_mut()
                .map(|s| std::mem::take(&mut s.outbox))
                .unwrap_or_default();
            outbox.append(&mut map.engine.panel_mut().outbox);
            Ok::<_, JsValue>((out, map.callbacks.clone(), outbox))
        })
        .map_err(|_| js_err("map state torn down"))??;

    deliver(&callbacks, outbox)?;
    Ok(out)
}

fn deliver(callbacks: &Callbacks, outbox: Vec<Outbound>) -> Result<(), JsValue> {
    for msg in outbox {
        match msg {
            Outbound::Mount(json, generation) => {
                if let Some(f) = &callbacks.on_mount {
                    f.call2(
                        &JsValue::NULL,
                        &js_sys::JSON::parse(&json)?,
                        &JsValue::from(generation),
                    )?;
                }
            }
            Outbound::Unmount => {
                if let Some(f) = &callbacks.on_unmount {
                    f.call0(&JsValue::NULL)?;
                }
            }
            Outbound::Interactive(ids) => {
                if let Some(f) = &callbacks.on_interactive {
                    let arr = js_sys::Array::new();
                    for id in ids {
                        arr.push(&JsValue::from_str(&id));
                    }
                    f.call1(&JsValue::NULL, &arr)?;
                }
            }
            Outbound::Selection(json) => {
                if let Some(f) = &callbacks.on_select {
                    let value = match json {
                        Some(json) => js_sys::JSON::parse(&json)?,
                        None => JsValue::NULL,
                    };
                    f.call1(&JsValue::NULL, &value)?;
                }
            }
        }
    }
    Ok(())
}

/// Hit lists the renderer reports. An unreadable list counts as a miss so the
/// selection is still overwritten.
fn parse_features(json: &str) -> Vec<MapFeature> {
    serde_json::from_str(json).unwrap_or_else(|e| {
        log_error(&format!("invalid features: {e}"));
        Vec::new()
    })
}

#[wasm_bindgen]
pub fn init() {
    init_panic_hook();
}

/// Stores a project document and refreshes every map showing it.
#[wasm_bindgen]
pub fn load_project(json: &str) -> Result<String, JsValue> {
    let project = Project::from_json_str(json).map_err(js_err)?;
    let id = project.id.clone();
    PROJECTS
        .try_with(|store| store.borrow_mut().upsert(project.clone()))
        .map_err(|_| js_err("project store torn down"))?;

    for map_instance in maps_showing(&id)? {
        let project = project.clone();
        with_map(&map_instance, |map| map.engine.set_project(project))?;
    }
    Ok(id.to_string())
}

/// Drops a project; maps showing it go back to loading.
#[wasm_bindgen]
pub fn unload_project(project_id: &str) -> Result<bool, JsValue> {
    let removed = PROJECTS
        .try_with(|store| store.borrow_mut().delete(project_id))
        .map_err(|_| js_err("project store torn down"))?;
    for map_instance in maps_showing(&ProjectId::new(project_id))? {
        with_map(&map_instance, |map| map.engine.clear_project())?;
    }
    Ok(removed)
}

fn maps_showing(project_id: &ProjectId) -> Result<Vec<String>, JsValue> {
    MAPS.try_with(|maps| {
        maps.borrow()
            .iter()
            .filter(|(_, m)| m.project_id.as_ref() == Some(project_id))
            .map(|(k, _)| k.clone())
            .collect()
    })
    .map_err(|_| js_err("map state torn down"))
}

/// Creates a map instance. `options_json` may carry `bounds` and `center`.
#[wasm_bindgen]
pub fn create_map(map_instance: &str, options_json: Option<String>) -> Result<(), JsValue> {
    init_panic_hook();
    let options: MapOptions = match options_json.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(raw).map_err(|e| js_err(format!("invalid map options: {e}")))?
        }
        _ => MapOptions::default(),
    };
    let config = EngineConfig::new(map_instance)
        .with_viewport(Viewport::from_parts(options.bounds, options.center));
    let map = WebMap {
        engine: ProjectMapEngine::new(config, OutboxPanel::default()),
        project_id: None,
        callbacks: Callbacks::default(),
    };
    MAPS.try_with(|maps| maps.borrow_mut().insert(map_instance.to_string(), map))
        .map_err(|_| js_err("map state torn down"))?;
    Ok(())
}

#[wasm_bindgen]
pub fn destroy_map(map_instance: &str) -> Result<bool, JsValue> {
    MAPS.try_with(|maps| maps.borrow_mut().remove(map_instance).is_some())
        .map_err(|_| js_err("map state torn down"))
}

/// Registers the JS side of the renderer.
///
/// - `on_mount(composition, generation)` builds sources and layers, then
///   calls `map_ready(instance, generation)` from the renderer's load event.
/// - `on_unmount()` removes them when the map stops resolving.
/// - `on_interactive(layerIds)` updates the layers pointer events are routed to.
/// - `on_select(feature | null)` feeds the feature data panel.
#[wasm_bindgen]
pub fn set_map_callbacks(
    map_instance: &str,
    on_mount: js_sys::Function,
    on_unmount: Option<js_sys::Function>,
    on_interactive: js_sys::Function,
    on_select: js_sys::Function,
) -> Result<(), JsValue> {
    with_map(map_instance, |map| {
        map.callbacks = Callbacks {
            on_mount: Some(on_mount),
            on_unmount,
            on_interactive: Some(on_interactive),
            on_select: Some(on_select),
        };
    })
}

#[wasm_bindgen]
pub fn show_project_map(
    map_instance: &str,
    project_id: &str,
    project_map_id: Option<String>,
) -> Result<(), JsValue> {
    let project = PROJECTS
        .try_with(|store| store.borrow().get(project_id))
        .map_err(|_| js_err("project store torn down"))?;
    with_map(map_instance, |map| {
        map.project_id = Some(ProjectId::new(project_id));
        map.engine.show(project, project_map_id.map(Into::into));
    })
}

/// Attaches the map to its canvas; the composition is mounted right away if
/// the project map is already resolved.
#[wasm_bindgen]
pub fn mount_map(map_instance: &str, canvas_id: &str) -> Result<(), JsValue> {
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(canvas_id))
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
    if canvas.is_none() {
        log_error(&format!("canvas {canvas_id} not found; cursor feedback disabled"));
    }
    with_map(map_instance, |map| {
        map.engine.attach_surface(CanvasSurface {
            canvas,
            outbox: Vec::new(),
        })
    })
}

#[wasm_bindgen]
pub fn unmount_map(map_instance: &str) -> Result<bool, JsValue> {
    with_map(map_instance, |map| map.engine.detach_surface().is_some())
}

#[wasm_bindgen]
pub fn map_view_state(map_instance: &str) -> Result<String, JsValue> {
    with_map(map_instance, |map| match map.engine.view() {
        MapView::Loading => "loading".to_string(),
        MapView::Composed(_) => "composed".to_string(),
    })
}

/// Ready signal of the mount numbered `generation`; signals of superseded
/// mounts return `false`.
#[wasm_bindgen]
pub fn map_ready(map_instance: &str, generation: u32) -> Result<bool, JsValue> {
    with_map(map_instance, |map| map.engine.on_ready_for(generation))
}

/// Returns the selected feature, or `null` when the click missed.
#[wasm_bindgen]
pub fn map_click(map_instance: &str, features_json: &str) -> Result<JsValue, JsValue> {
    let hits = parse_features(features_json);
    let selected = with_map(map_instance, |map| {
        map.engine
            .on_click(hits)
            .map(serde_json::to_string)
            .transpose()
    })?
    .map_err(js_err)?;
    match selected {
        Some(json) => js_sys::JSON::parse(&json),
        None => Ok(JsValue::NULL),
    }
}

/// Returns the CSS cursor now shown on the canvas.
#[wasm_bindgen]
pub fn map_pointer_enter(
    map_instance: &str,
    features_json: Option<String>,
) -> Result<String, JsValue> {
    let hits = features_json.as_deref().map(parse_features);
    with_map(map_instance, |map| {
        map.engine.on_pointer_enter(hits).as_css().to_string()
    })
}

#[wasm_bindgen]
pub fn map_pointer_leave(map_instance: &str) -> Result<String, JsValue> {
    with_map(map_instance, |map| {
        map.engine.on_pointer_leave().as_css().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_options_accept_bounds_and_center() {
        let options: MapOptions =
            serde_json::from_str(r#"{ "bounds": [[4.7, 45.7], [4.9, 45.8]], "center": [45.75, 4.85] }"#)
                .unwrap();
        assert_eq!(
            Viewport::from_parts(options.bounds, options.center),
            Viewport::Bounds(LngLatBounds::new([4.7, 45.7], [4.9, 45.8]))
        );

        let options: MapOptions = serde_json::from_str(r#"{ "center": [45.75, 4.85] }"#).unwrap();
        assert_eq!(
            Viewport::from_parts(options.bounds, options.center),
            Viewport::Center {
                lat: 45.75,
                lon: 4.85
            }
        );
    }

    #[test]
    fn mount_message_carries_generation() {
        let composition = MapComposition {
            map_id: "m1".into(),
            basemap_style: None,
            viewport: Viewport::Auto,
            controls: interaction::MapControls::default(),
            units: Vec::new(),
        };
        let mut surface = CanvasSurface::default();
        surface.mount(&composition, 7);
        surface.unmount();
        assert!(matches!(&surface.outbox[0], Outbound::Mount(json, 7) if json.contains("\"mapId\":\"m1\"")));
        assert!(matches!(&surface.outbox[1], Outbound::Unmount));
    }

    #[test]
    fn renderer_features_parse() {
        let hits = parse_features(
            r#"[{ "layer": { "id": "L1", "type": "circle" }, "properties": null,
                  "geometry": { "type": "GeometryCollection", "geometries": [] } }]"#,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer.as_ref().map(|l| l.as_str()), Some("L1"));
    }

    #[test]
    fn surface_queues_mount_and_interactive_messages() {
        let mut surface = CanvasSurface::default();
        surface.set_interactive_layers(&InteractiveLayerSet::new());
        // No canvas: cursor changes are dropped without touching the DOM.
        surface.set_cursor(Cursor::Pointer);
        assert_eq!(surface.outbox.len(), 1);
        assert!(matches!(&surface.outbox[0], Outbound::Interactive(ids) if ids.is_empty()));
    }
}
