use catalog::Project;
use scene::SelectedFeature;

/// Consumer of the current selection, e.g. an attribute table beside the map.
///
/// Receives a read-only view after every click; `None` means nothing is
/// selected.
pub trait FeatureDataPanel {
    fn render(&mut self, feature: Option<&SelectedFeature>, project: &Project);
}

impl<F> FeatureDataPanel for F
where
    F: FnMut(Option<&SelectedFeature>, &Project),
{
    fn render(&mut self, feature: Option<&SelectedFeature>, project: &Project) {
        self(feature, project)
    }
}

/// Panel that discards every update.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoPanel;

impl FeatureDataPanel for NoPanel {
    fn render(&mut self, _feature: Option<&SelectedFeature>, _project: &Project) {}
}
