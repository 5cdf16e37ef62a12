use catalog::{Project, ProjectMapDefinition};
use foundation::{LayerId, MapInstanceId, ProjectMapId, Viewport};
use layers::{InteractiveLayerSet, InteractivityRegistrar, RegistrarState, bind};
use runtime::EventQueue;
use scene::picking::pick_top;
use scene::{FeatureSelector, MapFeature, SelectedFeature};
use tracing::{debug, trace};

use crate::cursor::HoverCursorController;
use crate::event::MapEvent;
use crate::panel::FeatureDataPanel;
use crate::surface::{Cursor, MapComposition, MapControls, MapSurface};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Id of the map instance this engine drives.
    pub map_instance: MapInstanceId,
    pub viewport: Viewport,
    pub controls: MapControls,
}

impl EngineConfig {
    pub fn new(map_instance: impl Into<MapInstanceId>) -> Self {
        Self {
            map_instance: map_instance.into(),
            viewport: Viewport::Auto,
            controls: MapControls::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}

/// What the hosting page should show for this map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapView<'a> {
    /// No project yet, no map id, or the id matches no map of the project.
    Loading,
    Composed(&'a MapComposition),
}

/// The resolved map definition together with the project sources it was
/// bound against. Two resolutions are the same mount iff these are equal.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    definition: ProjectMapDefinition,
    composition: MapComposition,
}

/// Owns all interaction state of one project map instance.
///
/// Lifecycle:
/// - `set_project` / `select_map` (or `show`, which sets both at once) resolve
///   the map definition. A different definition rebinds sources and layers,
///   clears the selection and resets interactive layers to empty until the
///   surface reports `Ready`.
/// - `attach_surface` mounts the current composition on a renderer surface;
///   `detach_surface` unmounts it. Every mount gets a new generation, and a
///   ready signal tagged with an older one is ignored.
/// - Surface callbacks arrive through `handle` (or the `on_*` methods), one
///   at a time.
pub struct ProjectMapEngine<S, P> {
    config: EngineConfig,
    project: Option<Project>,
    map_id: Option<ProjectMapId>,
    resolved: Option<Resolved>,
    registrar: InteractivityRegistrar,
    selector: FeatureSelector,
    cursor: HoverCursorController,
    surface: Option<S>,
    mount_generation: u32,
    panel: P,
}

/// Hits count only once the current mount has registered its interactive
/// layers. Unattributed hits were already scoped by the renderer.
fn interactive_hit(registrar: &InteractivityRegistrar, layer: Option<&LayerId>) -> bool {
    registrar.is_ready()
        && layer.is_none_or(|layer| registrar.interactive().contains(layer.as_str()))
}

impl<S, P> ProjectMapEngine<S, P>
where
    S: MapSurface,
    P: FeatureDataPanel,
{
    pub fn new(config: EngineConfig, panel: P) -> Self {
        Self {
            config,
            project: None,
            map_id: None,
            resolved: None,
            registrar: InteractivityRegistrar::new(),
            selector: FeatureSelector::new(),
            cursor: HoverCursorController::new(),
            surface: None,
            mount_generation: 0,
            panel,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn view(&self) -> MapView<'_> {
        match &self.resolved {
            Some(r) => MapView::Composed(&r.composition),
            None => MapView::Loading,
        }
    }

    pub fn composition(&self) -> Option<&MapComposition> {
        self.resolved.as_ref().map(|r| &r.composition)
    }

    /// Generation of the latest mount; 0 before the first one.
    pub fn mount_generation(&self) -> u32 {
        self.mount_generation
    }

    pub fn registrar_state(&self) -> RegistrarState {
        self.registrar.state()
    }

    pub fn interactive_layers(&self) -> &InteractiveLayerSet {
        self.registrar.interactive()
    }

    pub fn selected(&self) -> Option<&SelectedFeature> {
        self.selector.selected()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor.current()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn set_project(&mut self, project: Project) {
        self.project = Some(project);
        self.resolve();
    }

    /// Drops the project, e.g. while the page loads another one.
    pub fn clear_project(&mut self) {
        self.project = None;
        self.resolve();
    }

    pub fn select_map(&mut self, map_id: Option<ProjectMapId>) {
        self.map_id = map_id;
        self.resolve();
    }

    /// Switches project and map id together, resolving (and mounting) once.
    pub fn show(&mut self, project: Option<Project>, map_id: Option<ProjectMapId>) {
        self.project = project;
        self.map_id = map_id;
        self.resolve();
    }

    /// Mounts the current composition (if any) on `surface`.
    ///
    /// A fresh mount waits for its own ready signal, so interactive layers
    /// start empty again.
    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.registrar.reset();
        self.mount();
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        let surface = self.surface.take()?;
        debug!("map {} unmounted", self.config.map_instance);
        self.registrar.reset();
        self.selector.clear();
        self.cursor.reset();
        Some(surface)
    }

    pub fn handle(&mut self, event: MapEvent) {
        match event {
            MapEvent::Ready => {
                self.on_ready();
            }
            MapEvent::Click { features } => {
                self.on_click(features);
            }
            MapEvent::PointerEnter { features } => {
                self.on_pointer_enter(features);
            }
            MapEvent::PointerLeave => {
                self.on_pointer_leave();
            }
        }
    }

    /// Runs every queued event to completion, in order.
    pub fn run(&mut self, queue: &mut EventQueue<MapEvent>) -> usize {
        queue.run(|event| self.handle(event))
    }

    /// Applies the ready signal of the current mount.
    ///
    /// Returns `true` when it completed registration.
    pub fn on_ready(&mut self) -> bool {
        let Some(resolved) = &self.resolved else {
            debug!("ready signal without a resolved map; ignoring");
            return false;
        };
        let Some(set) = self.registrar.on_ready(&resolved.composition.units) else {
            return false;
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.set_interactive_layers(set);
        }
        true
    }

    /// Ready signal carrying the generation of the mount it belongs to.
    pub fn on_ready_for(&mut self, generation: u32) -> bool {
        if generation != self.mount_generation {
            debug!(
                "ignoring ready signal of mount {generation}; current is {}",
                self.mount_generation
            );
            return false;
        }
        self.on_ready()
    }

    pub fn on_click(&mut self, hits: Vec<MapFeature>) -> Option<&SelectedFeature> {
        let registrar = &self.registrar;
        let top = pick_top(hits, |layer| interactive_hit(registrar, layer));
        if top.is_none() {
            trace!("click missed every interactive layer");
        }
        self.selector.on_click(top);
        if let Some(project) = &self.project {
            self.panel.render(self.selector.selected(), project);
        }
        self.selector.selected()
    }

    pub fn on_pointer_enter(&mut self, hits: Option<Vec<MapFeature>>) -> Cursor {
        let registrar = &self.registrar;
        let over_interactive = hits.is_some_and(|hits| {
            hits.iter()
                .any(|hit| interactive_hit(registrar, hit.layer.as_ref()))
        });
        self.cursor
            .on_pointer_enter(over_interactive, self.surface.as_mut())
    }

    pub fn on_pointer_leave(&mut self) -> Cursor {
        self.cursor.on_pointer_leave(self.surface.as_mut())
    }

    fn resolve(&mut self) {
        let definition = match (&self.project, &self.map_id) {
            (Some(project), Some(id)) if !id.as_str().is_empty() => {
                project.find_map(id.as_str()).cloned()
            }
            _ => None,
        };

        let Some(project) = &self.project else {
            self.unresolve();
            return;
        };
        let Some(definition) = definition else {
            if let Some(id) = &self.map_id {
                debug!("map {id} not found in project {}", project.id);
            }
            self.unresolve();
            return;
        };

        let composition = MapComposition {
            map_id: definition.id.clone(),
            basemap_style: definition.basemap_style.clone(),
            viewport: self.config.viewport,
            controls: self.config.controls,
            units: bind(&project.sources, &definition.layers),
        };
        let next = Resolved {
            definition,
            composition,
        };
        if self.resolved.as_ref() == Some(&next) {
            trace!("map definition unchanged; keeping current mount");
            return;
        }

        debug!(
            "map {} bound: {} sources, {} layers",
            next.definition.id,
            next.composition.units.len(),
            next.composition.layer_ids().count()
        );
        self.resolved = Some(next);
        self.registrar.reset();
        self.selector.clear();
        self.clear_hover();
        self.mount();
    }

    fn unresolve(&mut self) {
        if self.resolved.take().is_none() {
            return;
        }
        self.registrar.reset();
        self.selector.clear();
        self.clear_hover();
        if let Some(surface) = self.surface.as_mut() {
            surface.unmount();
        }
    }

    fn clear_hover(&mut self) {
        if self.cursor.current() != Cursor::Default {
            self.cursor.on_pointer_leave(self.surface.as_mut());
        }
        self.cursor.reset();
    }

    fn mount(&mut self) {
        let (Some(surface), Some(resolved)) = (self.surface.as_mut(), self.resolved.as_ref())
        else {
            return;
        };
        self.mount_generation = self.mount_generation.wrapping_add(1);
        surface.mount(&resolved.composition, self.mount_generation);
        surface.set_interactive_layers(self.registrar.interactive());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceCall};
    use catalog::{LayerDefinition, SourceDefinition};
    use foundation::LayerId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type Engine = ProjectMapEngine<RecordingSurface, crate::panel::NoPanel>;

    fn project() -> Project {
        let mut project = Project::new("p");
        project
            .sources
            .insert("S1", SourceDefinition::new("geojson"));
        project
            .sources
            .insert("S2", SourceDefinition::new("geojson"));
        project.maps.push(
            ProjectMapDefinition::new("m1")
                .with_layer(
                    LayerDefinition::new("L1", "circle")
                        .with_source("S1")
                        .with_metadata(json!({ "interactive": true })),
                )
                .with_layer(LayerDefinition::new("L2", "fill").with_source("S1")),
        );
        project.maps.push(
            ProjectMapDefinition::new("m2").with_layer(
                LayerDefinition::new("L3", "line")
                    .with_source("S2")
                    .with_metadata(json!({ "interactive": true })),
            ),
        );
        project
    }

    fn engine() -> Engine {
        ProjectMapEngine::new(EngineConfig::new("main"), crate::panel::NoPanel)
    }

    fn ids(set: &InteractiveLayerSet) -> Vec<&str> {
        set.iter().map(LayerId::as_str).collect()
    }

    #[test]
    fn loading_until_project_and_map_id() {
        let mut e = engine();
        assert_eq!(e.view(), MapView::Loading);
        e.select_map(Some("m1".into()));
        assert_eq!(e.view(), MapView::Loading);
        e.set_project(project());
        assert!(matches!(e.view(), MapView::Composed(_)));

        e.select_map(Some("nope".into()));
        assert_eq!(e.view(), MapView::Loading);
        e.select_map(Some("".into()));
        assert_eq!(e.view(), MapView::Loading);

        e.select_map(Some("m1".into()));
        assert!(matches!(e.view(), MapView::Composed(_)));
        e.clear_project();
        assert_eq!(e.view(), MapView::Loading);
    }

    #[test]
    fn interactive_layers_wait_for_ready() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());

        assert_eq!(e.registrar_state(), RegistrarState::Uninitialized);
        assert!(e.interactive_layers().is_empty());
        assert!(e.on_ready());
        assert_eq!(ids(e.interactive_layers()), vec!["L1"]);
        assert!(!e.on_ready());

        let surface = e.surface().expect("surface");
        assert_eq!(
            surface.calls,
            vec![
                SurfaceCall::Mount("m1".into()),
                SurfaceCall::InteractiveLayers(vec![]),
                SurfaceCall::InteractiveLayers(vec!["L1".into()]),
            ]
        );
    }

    #[test]
    fn switching_maps_remounts_and_resets() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();
        e.on_click(vec![MapFeature::new("L1")]);
        assert!(e.selected().is_some());

        e.select_map(Some("m2".into()));
        assert_eq!(e.registrar_state(), RegistrarState::Uninitialized);
        assert!(e.interactive_layers().is_empty());
        assert!(e.selected().is_none());
        e.on_ready();
        assert_eq!(ids(e.interactive_layers()), vec!["L3"]);
    }

    #[test]
    fn same_definition_keeps_mount() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();

        e.set_project(project());
        assert!(e.registrar_state() == RegistrarState::Ready);
        let mounts = e
            .surface()
            .expect("surface")
            .calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Mount(_)))
            .count();
        assert_eq!(mounts, 1);
    }

    #[test]
    fn clicks_before_ready_select_nothing() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        assert!(e.on_click(vec![MapFeature::new("L1")]).is_none());
    }

    #[test]
    fn clicks_ignore_non_interactive_layers() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.on_ready();

        assert!(e.on_click(vec![MapFeature::new("L2")]).is_none());
        let selected = e
            .on_click(vec![MapFeature::new("L2"), MapFeature::new("L1")])
            .expect("selected");
        assert_eq!(selected.layer.as_ref().map(LayerId::as_str), Some("L1"));
    }

    #[test]
    fn hover_sets_cursor_on_surface() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();

        assert_eq!(
            e.on_pointer_enter(Some(vec![MapFeature::new("L1")])),
            Cursor::Pointer
        );
        assert_eq!(e.surface().map(|s| s.cursor), Some(Cursor::Pointer));
        assert_eq!(e.on_pointer_leave(), Cursor::Default);
        assert_eq!(e.surface().map(|s| s.cursor), Some(Cursor::Default));

        e.on_pointer_enter(Some(vec![MapFeature::new("L1")]));
        assert_eq!(e.on_pointer_enter(None), Cursor::Default);
    }

    #[test]
    fn detach_clears_mount_state() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();
        e.on_click(vec![MapFeature::new("L1")]);

        let surface = e.detach_surface().expect("surface");
        assert!(surface.mounted.is_some());
        assert!(e.selected().is_none());
        assert!(e.interactive_layers().is_empty());
        assert!(e.detach_surface().is_none());
    }

    fn mounts(e: &Engine) -> Vec<String> {
        e.surface()
            .expect("surface")
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Mount(id) => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unattributed_hits_wait_for_ready() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());

        assert!(e.on_click(vec![MapFeature::default()]).is_none());
        assert_eq!(
            e.on_pointer_enter(Some(vec![MapFeature::default()])),
            Cursor::Default
        );

        e.on_ready();
        assert!(e.on_click(vec![MapFeature::default()]).is_some());
        assert_eq!(
            e.on_pointer_enter(Some(vec![MapFeature::default()])),
            Cursor::Pointer
        );
    }

    #[test]
    fn show_switches_project_and_map_in_one_mount() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        let first = e.mount_generation();
        assert!(e.on_ready_for(first));

        let mut next = project();
        next.sources.insert(
            "S1",
            SourceDefinition::new("geojson").with_config("data", json!("v2.geojson")),
        );
        e.show(Some(next), Some("m2".into()));

        assert_eq!(mounts(&e), vec!["m1", "m2"]);
        assert_eq!(e.surface().map(|s| s.generation), Some(e.mount_generation()));
        assert_eq!(e.registrar_state(), RegistrarState::Uninitialized);
        assert!(!e.on_ready_for(first));
        assert_eq!(e.registrar_state(), RegistrarState::Uninitialized);
        assert!(e.on_ready_for(e.mount_generation()));
        assert_eq!(ids(e.interactive_layers()), vec!["L3"]);
    }

    #[test]
    fn hover_edge_cases() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.on_ready();

        // No surface attached: nothing to update.
        assert_eq!(
            e.on_pointer_enter(Some(vec![MapFeature::new("L1")])),
            Cursor::Default
        );

        e.attach_surface(RecordingSurface::new());
        e.on_ready();
        e.on_pointer_enter(Some(vec![MapFeature::new("L1")]));
        assert_eq!(e.on_pointer_enter(Some(vec![])), Cursor::Default);

        e.on_pointer_enter(Some(vec![MapFeature::new("L1")]));
        assert_eq!(
            e.on_pointer_enter(Some(vec![MapFeature::new("L2")])),
            Cursor::Default
        );
        assert_eq!(e.surface().map(|s| s.cursor.as_css()), Some(""));
    }

    #[test]
    fn losing_the_map_unmounts_and_resets_cursor() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();
        e.on_pointer_enter(Some(vec![MapFeature::new("L1")]));

        e.select_map(Some("missing".into()));
        assert_eq!(e.view(), MapView::Loading);
        assert_eq!(e.cursor(), Cursor::Default);
        let surface = e.surface().expect("surface");
        assert!(surface.mounted.is_none());
        assert_eq!(
            surface.calls[surface.calls.len() - 2..].to_vec(),
            vec![SurfaceCall::Cursor(Cursor::Default), SurfaceCall::Unmount]
        );
    }

    #[test]
    fn remount_resets_cursor() {
        let mut e = engine();
        e.set_project(project());
        e.select_map(Some("m1".into()));
        e.attach_surface(RecordingSurface::new());
        e.on_ready();
        e.on_pointer_enter(Some(vec![MapFeature::new("L1")]));

        e.select_map(Some("m2".into()));
        assert_eq!(e.cursor(), Cursor::Default);
        assert_eq!(e.surface().map(|s| s.cursor), Some(Cursor::Default));
    }
}
