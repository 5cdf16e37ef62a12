use std::cell::RefCell;
use std::rc::Rc;

use catalog::Project;
use foundation::{LngLatBounds, Viewport};
use interaction::{
    Cursor, EngineConfig, MapEvent, MapView, ProjectMapEngine, RecordingSurface, SurfaceCall,
};
use layers::RegistrarState;
use pretty_assertions::assert_eq;
use runtime::EventQueue;
use scene::SelectedFeature;
use serde_json::{Value, json};

const PROJECT: &str = r#"{
    "id": "lyon",
    "name": "Lyon soundscape",
    "sources": {
        "S1": {
            "type": "geojson",
            "data": "https://data.example.org/s1.geojson",
            "variables": [{ "name": "laeq", "unit": "dB(A)" }],
            "timeSeries": { "step": "1h" }
        },
        "S2": { "type": "geojson", "data": "https://data.example.org/s2.geojson" },
        "S3": { "type": "vector", "url": "https://tiles.example.org/s3.json" }
    },
    "maps": [
        {
            "id": "perception",
            "basemapStyle": "https://tiles.example.org/style.json",
            "layers": [
                { "id": "background", "type": "background" },
                { "id": "L1", "type": "circle", "source": "S1",
                  "metadata": { "interactive": true } },
                { "id": "L1-halo", "type": "circle", "source": "S1",
                  "paint": { "circle-radius": 8 } },
                { "id": "S3-roads", "type": "line", "source": "S3",
                  "source-layer": "roads", "metadata": { "legend": "Roads" } },
                { "id": "orphan", "type": "fill", "source": "S9",
                  "metadata": { "interactive": true } }
            ]
        },
        { "id": "noise", "layers": [] }
    ]
}"#;

type Panel = Box<dyn FnMut(Option<&SelectedFeature>, &Project)>;

fn engine_with_panel() -> (
    ProjectMapEngine<RecordingSurface, Panel>,
    Rc<RefCell<Vec<Option<Value>>>>,
) {
    let seen: Rc<RefCell<Vec<Option<Value>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let panel: Panel = Box::new(move |feature: Option<&SelectedFeature>, project: &Project| {
        assert_eq!(project.id, "lyon");
        sink.borrow_mut()
            .push(feature.map(|f| Value::Object(f.properties.clone())));
    });

    let config = EngineConfig::new("project-map").with_viewport(Viewport::Bounds(
        LngLatBounds::new([4.7, 45.7], [4.9, 45.8]),
    ));
    (ProjectMapEngine::new(config, panel), seen)
}

#[test]
fn binds_only_referenced_sources_in_order() {
    let (mut engine, _) = engine_with_panel();
    engine.set_project(Project::from_json_str(PROJECT).unwrap());
    engine.select_map(Some("perception".into()));

    let MapView::Composed(composition) = engine.view() else {
        panic!("map should be composed");
    };
    assert_eq!(
        composition.basemap_style.as_deref(),
        Some("https://tiles.example.org/style.json")
    );

    let units: Vec<(String, Vec<String>)> = composition
        .units
        .iter()
        .map(|u| {
            (
                u.id.to_string(),
                u.layer_ids().map(|l| l.to_string()).collect(),
            )
        })
        .collect();
    assert_eq!(
        units,
        vec![
            (
                "S1".to_string(),
                vec!["L1".to_string(), "L1-halo".to_string()]
            ),
            ("S3".to_string(), vec!["S3-roads".to_string()]),
        ]
    );
    assert_eq!(
        Value::Object(composition.units[0].source.clone()),
        json!({ "type": "geojson", "data": "https://data.example.org/s1.geojson" })
    );
}

#[test]
fn event_loop_drives_selection_and_cursor() {
    let (mut engine, seen) = engine_with_panel();
    engine.set_project(Project::from_json_str(PROJECT).unwrap());
    engine.select_map(Some("perception".into()));
    engine.attach_surface(RecordingSurface::new());
    assert_eq!(engine.registrar_state(), RegistrarState::Uninitialized);

    let script: Vec<MapEvent> = serde_json::from_value(json!([
        { "event": "ready" },
        { "event": "pointerEnter", "features": [{ "layer": "L1" }] },
        { "event": "click", "features": [
            { "layer": "L1", "source": "S1", "id": 4,
              "geometry": { "type": "Point", "coordinates": [4.83, 45.76] },
              "properties": { "name": "Place Bellecour",
                              "survey": "{\"pleasant\":0.8,\"eventful\":0.3}",
                              "comment": "{sic}" } },
            { "layer": "L1", "properties": { "name": "second" } }
        ] },
        { "event": "pointerLeave" },
        { "event": "click", "features": [] }
    ]))
    .unwrap();

    let mut queue = EventQueue::new();
    for event in script {
        queue.push(event);
    }
    assert_eq!(engine.run(&mut queue), 5);

    assert_eq!(engine.registrar_state(), RegistrarState::Ready);
    let interactive: Vec<&str> = engine
        .interactive_layers()
        .iter()
        .map(|l| l.as_str())
        .collect();
    assert_eq!(interactive, vec!["L1"]);

    assert_eq!(
        *seen.borrow(),
        vec![
            Some(json!({
                "name": "Place Bellecour",
                "survey": { "pleasant": 0.8, "eventful": 0.3 },
                "comment": "{sic}"
            })),
            None,
        ]
    );
    assert!(engine.selected().is_none());
    assert_eq!(engine.cursor(), Cursor::Default);

    let surface = engine.surface().expect("surface");
    assert_eq!(
        surface.calls,
        vec![
            SurfaceCall::Mount("perception".into()),
            SurfaceCall::InteractiveLayers(vec![]),
            SurfaceCall::InteractiveLayers(vec!["L1".into()]),
            SurfaceCall::Cursor(Cursor::Pointer),
            SurfaceCall::Cursor(Cursor::Default),
        ]
    );

    let kinds: Vec<&str> = queue.trace().kinds().collect();
    assert_eq!(
        kinds,
        vec!["ready", "pointer_enter", "click", "pointer_leave", "click"]
    );
}

#[test]
fn layer_without_interactive_flag_is_rendered_but_not_interactive() {
    let (mut engine, _) = engine_with_panel();
    engine.set_project(Project::from_json_str(PROJECT).unwrap());
    engine.select_map(Some("perception".into()));
    engine.on_ready();

    let composition = engine.composition().expect("composition");
    assert!(composition.layer_ids().any(|l| l == "L1-halo"));
    assert!(!engine.interactive_layers().contains("L1-halo"));
    assert!(!engine.interactive_layers().contains("orphan"));
    assert!(
        engine
            .on_click(vec![scene::MapFeature::new("L1-halo")])
            .is_none()
    );
}

#[test]
fn empty_map_composes_without_units() {
    let (mut engine, _) = engine_with_panel();
    engine.set_project(Project::from_json_str(PROJECT).unwrap());
    engine.select_map(Some("noise".into()));
    let composition = engine.composition().expect("composition");
    assert!(composition.units.is_empty());
    assert!(engine.on_ready());
    assert!(engine.interactive_layers().is_empty());
}
