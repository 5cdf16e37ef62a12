use serde::{Deserialize, Serialize};

use crate::bounds::LngLatBounds;

/// Initial camera placement for a freshly mounted map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Viewport {
    /// Let the renderer (or the basemap style) decide.
    #[default]
    Auto,
    Bounds(LngLatBounds),
    Center { lat: f64, lon: f64 },
}

impl Viewport {
    /// Builds a viewport from the optional inputs a page hands to the map.
    ///
    /// `center` is a `[lat, lon]` pair. Bounds take precedence over a center.
    pub fn from_parts(bounds: Option<LngLatBounds>, center: Option<[f64; 2]>) -> Self {
        match (bounds, center) {
            (Some(b), _) => Viewport::Bounds(b),
            (None, Some([lat, lon])) => Viewport::Center { lat, lon },
            (None, None) => Viewport::Auto,
        }
    }
}
