use std::collections::{BTreeMap, BTreeSet};

use catalog::PlaceCatalog;
use formats::PlaceGeometry;
use foundation::PlaceId;
use scene::Selection;

use crate::layer::{LayerSpec, SourceSpec};
use crate::surface::{MapSurface, SurfaceError, remove_layer_if_present, remove_source_if_present};

pub const OVERLAY_COLOR: &str = "#7CB342";
pub const OVERLAY_FILL_OPACITY: f64 = 0.3;
pub const OVERLAY_LINE_WIDTH: f64 = 2.0;

/// Names of the map objects that make up one place's overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayHandle {
    pub place: PlaceId,
    pub source_id: String,
    pub fill_layer_id: String,
    pub line_layer_id: String,
}

impl OverlayHandle {
    pub fn for_place(place: &PlaceId) -> Self {
        Self {
            place: place.clone(),
            source_id: place.source_id(),
            fill_layer_id: place.fill_layer_id(),
            line_layer_id: place.line_layer_id(),
        }
    }

    pub fn fill_layer(&self) -> LayerSpec {
        LayerSpec::fill(&self.fill_layer_id, &self.source_id, OVERLAY_COLOR, OVERLAY_FILL_OPACITY)
    }

    pub fn line_layer(&self) -> LayerSpec {
        LayerSpec::line(&self.line_layer_id, &self.source_id, OVERLAY_COLOR, OVERLAY_LINE_WIDTH)
    }
}

/// Adds whatever part of the overlay is missing from the surface.
///
/// Returns `true` if anything was added.
pub fn install_overlay<S: MapSurface + ?Sized>(
    surface: &S,
    handle: &OverlayHandle,
    geometry: &PlaceGeometry,
) -> Result<bool, SurfaceError> {
    let mut added = false;
    if !surface.has_source(&handle.source_id)? {
        let spec = SourceSpec::GeoJson {
            data: geometry.data.clone(),
        };
        surface.add_source(&handle.source_id, &spec)?;
        added = true;
    }
    for layer in [handle.fill_layer(), handle.line_layer()] {
        if !surface.has_layer(&layer.id)? {
            surface.add_layer(&layer)?;
            added = true;
        }
    }
    Ok(added)
}

/// Removes the fill layer, then the line layer, then the source.
pub fn teardown_overlay<S: MapSurface + ?Sized>(surface: &S, handle: &OverlayHandle) -> Result<(), SurfaceError> {
    remove_layer_if_present(surface, &handle.fill_layer_id)?;
    remove_layer_if_present(surface, &handle.line_layer_id)?;
    remove_source_if_present(surface, &handle.source_id)?;
    Ok(())
}

/// Which overlays are on the map, keyed by place.
///
/// This is the reconciler's own bookkeeping; it never reads the renderer's style
/// to find out what is rendered.
///
/// An overlay whose install was cut short is tracked as partial: it still
/// needs its missing parts added if it stays selected, and tearing down if not.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverlayRegistry {
    overlays: BTreeMap<PlaceId, OverlayHandle>,
    partial: BTreeSet<PlaceId>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fully installed overlay. Returns `false` if the place was already tracked.
    pub fn insert(&mut self, handle: OverlayHandle) -> bool {
        self.partial.remove(&handle.place);
        self.overlays.insert(handle.place.clone(), handle).is_none()
    }

    /// Records an overlay that may be only partly on the map.
    pub fn insert_partial(&mut self, handle: OverlayHandle) {
        self.partial.insert(handle.place.clone());
        self.overlays.insert(handle.place.clone(), handle);
    }

    pub fn remove(&mut self, place: &PlaceId) -> Option<OverlayHandle> {
        self.partial.remove(place);
        self.overlays.remove(place)
    }

    /// Tracked and fully installed.
    pub fn is_complete(&self, place: &PlaceId) -> bool {
        self.overlays.contains_key(place) && !self.partial.contains(place)
    }

    pub fn get(&self, place: &PlaceId) -> Option<&OverlayHandle> {
        self.overlays.get(place)
    }

    pub fn contains(&self, place: &PlaceId) -> bool {
        self.overlays.contains_key(place)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Every tracked place, partial ones included, in ascending id order.
    pub fn places(&self) -> Vec<PlaceId> {
        self.overlays.keys().cloned().collect()
    }

    /// Fully installed places in ascending id order.
    pub fn complete_places(&self) -> Vec<PlaceId> {
        self.overlays
            .keys()
            .filter(|p| !self.partial.contains(*p))
            .cloned()
            .collect()
    }

    /// Rendered places that are no longer selected or no longer in the catalog.
    pub fn stale(&self, selection: &Selection, catalog: &PlaceCatalog) -> Vec<OverlayHandle> {
        self.overlays
            .values()
            .filter(|h| !selection.contains(&h.place) || !catalog.contains(&h.place))
            .cloned()
            .collect()
    }
}
