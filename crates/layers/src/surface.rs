use std::cell::RefCell;
use std::collections::BTreeMap;

use scene::CameraCommand;

use crate::layer::{LayerSpec, SourceSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    NotFound(String),
    AlreadyExists(String),
    /// The style is mid-transition and cannot be inspected yet.
    StyleNotReady,
    /// A source is still referenced by a layer.
    InUse(String),
    Backend(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::NotFound(id) => write!(f, "not found on map: {id}"),
            SurfaceError::AlreadyExists(id) => write!(f, "already on map: {id}"),
            SurfaceError::StyleNotReady => write!(f, "map style not ready"),
            SurfaceError::InUse(id) => write!(f, "source still in use by a layer: {id}"),
            SurfaceError::Backend(msg) => write!(f, "map backend error: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// The slice of a map renderer the client drives.
///
/// Methods take `&self`: the renderer is a single shared handle mutated only
/// from the UI thread.
pub trait MapSurface {
    fn has_source(&self, id: &str) -> Result<bool, SurfaceError>;
    fn has_layer(&self, id: &str) -> Result<bool, SurfaceError>;
    fn add_source(&self, id: &str, spec: &SourceSpec) -> Result<(), SurfaceError>;
    fn add_layer(&self, spec: &LayerSpec) -> Result<(), SurfaceError>;
    fn remove_layer(&self, id: &str) -> Result<(), SurfaceError>;
    fn remove_source(&self, id: &str) -> Result<(), SurfaceError>;
    fn apply_camera(&self, command: &CameraCommand) -> Result<(), SurfaceError>;
    fn set_terrain(&self, source: &str, exaggeration: f64) -> Result<(), SurfaceError>;
    fn resize(&self) -> Result<(), SurfaceError>;
}

/// Removes a layer; a missing layer is not an error.
pub fn remove_layer_if_present<S: MapSurface + ?Sized>(surface: &S, id: &str) -> Result<bool, SurfaceError> {
    if !surface.has_layer(id)? {
        return Ok(false);
    }
    match surface.remove_layer(id) {
        Ok(()) => Ok(true),
        Err(SurfaceError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Removes a source; a missing source is not an error.
pub fn remove_source_if_present<S: MapSurface + ?Sized>(surface: &S, id: &str) -> Result<bool, SurfaceError> {
    if !surface.has_source(id)? {
        return Ok(false);
    }
    match surface.remove_source(id) {
        Ok(()) => Ok(true),
        Err(SurfaceError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// One recorded call against an [`InMemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    AddSource(String),
    AddLayer(String),
    RemoveLayer(String),
    RemoveSource(String),
    Camera(CameraCommand),
    SetTerrain(String, f64),
    Resize,
}

impl SurfaceState {
    fn record(&mut self, op: SurfaceOp) {
        if op.is_style_mutation() {
            if let Some(n) = self.mutation_budget.as_mut() {
                *n = n.saturating_sub(1);
            }
        }
        self.ops.push(op);
    }
}

impl SurfaceOp {
    /// Whether the op changes sources or layers.
    pub fn is_style_mutation(&self) -> bool {
        matches!(
            self,
            SurfaceOp::AddSource(_)
                | SurfaceOp::AddLayer(_)
                | SurfaceOp::RemoveLayer(_)
                | SurfaceOp::RemoveSource(_)
        )
    }
}

#[derive(Debug)]
struct SurfaceState {
    style_ready: bool,
    /// Style mutations allowed before the style starts reporting not-ready.
    mutation_budget: Option<usize>,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    ops: Vec<SurfaceOp>,
}

/// Headless map surface that enforces the renderer's basic rules
/// (no duplicate ids, layers need their source, sources in use cannot be removed)
/// and records every call.
#[derive(Debug)]
pub struct InMemorySurface {
    state: RefCell<SurfaceState>,
}

impl Default for InMemorySurface {
    fn default() -> Self {
        Self {
            state: RefCell::new(SurfaceState {
                style_ready: true,
                mutation_budget: None,
                sources: BTreeMap::new(),
                layers: Vec::new(),
                ops: Vec::new(),
            }),
        }
    }
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_style_ready(&self, ready: bool) {
        let mut s = self.state.borrow_mut();
        s.style_ready = ready;
        s.mutation_budget = None;
    }

    /// Simulates a style swap starting mid-pass: after `n` more style
    /// mutations every call that needs the style fails with `StyleNotReady`.
    pub fn style_unready_after(&self, n: usize) {
        self.state.borrow_mut().mutation_budget = Some(n);
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.state.borrow().sources.keys().cloned().collect()
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.state.borrow().layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn source(&self, id: &str) -> Option<SourceSpec> {
        self.state.borrow().sources.get(id).cloned()
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.state.borrow().ops.clone()
    }

    pub fn take_ops(&self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.state.borrow_mut().ops)
    }

    pub fn style_mutations(&self) -> usize {
        self.state.borrow().ops.iter().filter(|op| op.is_style_mutation()).count()
    }

    fn ensure_ready(&self) -> Result<(), SurfaceError> {
        let s = self.state.borrow();
        if s.style_ready && s.mutation_budget != Some(0) {
            Ok(())
        } else {
            Err(SurfaceError::StyleNotReady)
        }
    }
}

impl MapSurface for InMemorySurface {
    fn has_source(&self, id: &str) -> Result<bool, SurfaceError> {
        self.ensure_ready()?;
        Ok(self.state.borrow().sources.contains_key(id))
    }

    fn has_layer(&self, id: &str) -> Result<bool, SurfaceError> {
        self.ensure_ready()?;
        Ok(self.state.borrow().layers.iter().any(|l| l.id == id))
    }

    fn add_source(&self, id: &str, spec: &SourceSpec) -> Result<(), SurfaceError> {
        self.ensure_ready()?;
        let mut s = self.state.borrow_mut();
        if s.sources.contains_key(id) {
            return Err(SurfaceError::AlreadyExists(id.to_string()));
        }
        s.sources.insert(id.to_string(), spec.clone());
        s.record(SurfaceOp::AddSource(id.to_string()));
        Ok(())
    }

    fn add_layer(&self, spec: &LayerSpec) -> Result<(), SurfaceError> {
        self.ensure_ready()?;
        let mut s = self.state.borrow_mut();
        if s.layers.iter().any(|l| l.id == spec.id) {
            return Err(SurfaceError::AlreadyExists(spec.id.clone()));
        }
        if !s.sources.contains_key(&spec.source) {
            return Err(SurfaceError::NotFound(spec.source.clone()));
        }
        s.layers.push(spec.clone());
        s.record(SurfaceOp::AddLayer(spec.id.clone()));
        Ok(())
    }

    fn remove_layer(&self, id: &str) -> Result<(), SurfaceError> {
        self.ensure_ready()?;
        let mut s = self.state.borrow_mut();
        let Some(pos) = s.layers.iter().position(|l| l.id == id) else {
            return Err(SurfaceError::NotFound(id.to_string()));
        };
        s.layers.remove(pos);
        s.record(SurfaceOp::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn remove_source(&self, id: &str) -> Result<(), SurfaceError> {
        self.ensure_ready()?;
        let mut s = self.state.borrow_mut();
        if !s.sources.contains_key(id) {
            return Err(SurfaceError::NotFound(id.to_string()));
        }
        if s.layers.iter().any(|l| l.source == id) {
            return Err(SurfaceError::InUse(id.to_string()));
        }
        s.sources.remove(id);
        s.record(SurfaceOp::RemoveSource(id.to_string()));
        Ok(())
    }

    fn apply_camera(&self, command: &CameraCommand) -> Result<(), SurfaceError> {
        self.state.borrow_mut().ops.push(SurfaceOp::Camera(command.clone()));
        Ok(())
    }

    fn set_terrain(&self, source: &str, exaggeration: f64) -> Result<(), SurfaceError> {
        self.ensure_ready()?;
        let mut s = self.state.borrow_mut();
        if !s.sources.contains_key(source) {
            return Err(SurfaceError::NotFound(source.to_string()));
        }
        s.ops.push(SurfaceOp::SetTerrain(source.to_string(), exaggeration));
        Ok(())
    }

    fn resize(&self) -> Result<(), SurfaceError> {
        self.state.borrow_mut().ops.push(SurfaceOp::Resize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geojson() -> SourceSpec {
        SourceSpec::GeoJson {
            data: json!({"type": "FeatureCollection", "features": []}),
        }
    }

    #[test]
    fn layer_requires_its_source() {
        let map = InMemorySurface::new();
        let err = map.add_layer(&LayerSpec::fill("a-fill", "a", "#000", 1.0)).unwrap_err();
        assert_eq!(err, SurfaceError::NotFound("a".to_string()));
    }

    #[test]
    fn source_in_use_cannot_be_removed() {
        let map = InMemorySurface::new();
        map.add_source("a", &geojson()).unwrap();
        map.add_layer(&LayerSpec::line("a-line", "a", "#000", 2.0)).unwrap();
        assert_eq!(map.remove_source("a"), Err(SurfaceError::InUse("a".to_string())));
        map.remove_layer("a-line").unwrap();
        map.remove_source("a").unwrap();
        assert!(map.source_ids().is_empty());
    }

    #[test]
    fn removal_helpers_tolerate_missing_ids() {
        let map = InMemorySurface::new();
        assert_eq!(remove_layer_if_present(&map, "nope"), Ok(false));
        assert_eq!(remove_source_if_present(&map, "nope"), Ok(false));
        assert_eq!(map.style_mutations(), 0);
    }

    #[test]
    fn inspection_fails_while_style_is_loading() {
        let map = InMemorySurface::new();
        map.set_style_ready(false);
        assert_eq!(map.has_source("a"), Err(SurfaceError::StyleNotReady));
        map.set_style_ready(true);
        assert_eq!(map.has_source("a"), Ok(false));
    }

    #[test]
    fn style_can_go_unready_mid_sequence() {
        let map = InMemorySurface::new();
        map.style_unready_after(1);
        map.add_source("a", &geojson()).unwrap();
        assert_eq!(map.has_layer("a-fill"), Err(SurfaceError::StyleNotReady));
        map.set_style_ready(true);
        assert_eq!(map.has_layer("a-fill"), Ok(false));
    }

    #[test]
    fn duplicate_source_is_rejected() {
        let map = InMemorySurface::new();
        map.add_source("a", &geojson()).unwrap();
        assert_eq!(
            map.add_source("a", &geojson()),
            Err(SurfaceError::AlreadyExists("a".to_string()))
        );
        assert_eq!(map.ops(), vec![SurfaceOp::AddSource("a".to_string())]);
    }
}
