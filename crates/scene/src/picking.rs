use foundation::LayerId;

use crate::feature::MapFeature;

/// Picks the top-most hit among those the caller considers eligible.
///
/// Ordering contract:
/// - Hits are in renderer order, top-most first; the first eligible hit wins.
/// - `eligible` sees `None` for hits without layer attribution and decides
///   for those too.
pub fn pick_top<I, F>(hits: I, mut eligible: F) -> Option<MapFeature>
where
    I: IntoIterator<Item = MapFeature>,
    F: FnMut(Option<&LayerId>) -> bool,
{
    hits.into_iter().find(|hit| eligible(hit.layer.as_ref()))
}
