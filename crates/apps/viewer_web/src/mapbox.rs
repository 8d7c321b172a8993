use foundation::LngLat;
use layers::{LayerSpec, MapSurface, SourceSpec, SurfaceError};
use scene::CameraCommand;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

pub const MAP_STYLE: &str = "mapbox://styles/mapbox/satellite-streets-v12";

#[wasm_bindgen(inline_js = "
export function gis_create_map(container, token, style, lng, lat, zoom) {
    if (typeof mapboxgl === 'undefined') {
        throw new Error('mapbox-gl is not loaded');
    }
    mapboxgl.accessToken = token;
    return new mapboxgl.Map({ container, style, center: [lng, lat], zoom, pitch: 0, bearing: 0 });
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn gis_create_map(
        container: &str,
        token: &str,
        style: &str,
        lng: f64,
        lat: f64,
        zoom: f64,
    ) -> Result<MapboxMap, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    pub type MapboxMap;

    #[wasm_bindgen(method, catch, js_name = getSource)]
    fn get_source(this: &MapboxMap, id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getLayer)]
    fn get_layer(this: &MapboxMap, id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addSource)]
    fn add_source(this: &MapboxMap, id: &str, spec: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &MapboxMap, spec: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeLayer)]
    fn remove_layer(this: &MapboxMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeSource)]
    fn remove_source(this: &MapboxMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = easeTo)]
    fn ease_to(this: &MapboxMap, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = fitBounds)]
    fn fit_bounds(this: &MapboxMap, bounds: &JsValue, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setTerrain)]
    fn set_terrain(this: &MapboxMap, spec: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn resize(this: &MapboxMap) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &MapboxMap, event: &str, callback: &js_sys::Function);
}

fn to_js(value: &Value) -> Result<JsValue, SurfaceError> {
    js_sys::JSON::parse(&value.to_string()).map_err(|e| SurfaceError::Backend(js_message(&e)))
}

pub fn js_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

fn backend(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(js_message(&err))
}

/// Mapbox GL map driven through [`MapSurface`].
///
/// Lookups throw while the style is being swapped; those are reported as
/// [`SurfaceError::StyleNotReady`] so the reconciler retries on the next trigger.
pub struct MapboxSurface {
    map: MapboxMap,
}

impl MapboxSurface {
    pub fn create(container: &str, token: &str, center: LngLat, zoom: f64) -> Result<Self, JsValue> {
        let map = gis_create_map(container, token, MAP_STYLE, center.lng, center.lat, zoom)?;
        Ok(Self { map })
    }

    pub fn map(&self) -> &MapboxMap {
        &self.map
    }
}

impl MapSurface for MapboxSurface {
    fn has_source(&self, id: &str) -> Result<bool, SurfaceError> {
        let found = self.map.get_source(id).map_err(|_| SurfaceError::StyleNotReady)?;
        Ok(!found.is_undefined() && !found.is_null())
    }

    fn has_layer(&self, id: &str) -> Result<bool, SurfaceError> {
        let found = self.map.get_layer(id).map_err(|_| SurfaceError::StyleNotReady)?;
        Ok(!found.is_undefined() && !found.is_null())
    }

    fn add_source(&self, id: &str, spec: &SourceSpec) -> Result<(), SurfaceError> {
        let spec = to_js(&spec.to_style_json())?;
        self.map.add_source(id, &spec).map_err(backend)
    }

    fn add_layer(&self, spec: &LayerSpec) -> Result<(), SurfaceError> {
        let spec = to_js(&spec.to_style_json())?;
        self.map.add_layer(&spec).map_err(backend)
    }

    fn remove_layer(&self, id: &str) -> Result<(), SurfaceError> {
        self.map.remove_layer(id).map_err(backend)
    }

    fn remove_source(&self, id: &str) -> Result<(), SurfaceError> {
        self.map.remove_source(id).map_err(backend)
    }

    fn apply_camera(&self, command: &CameraCommand) -> Result<(), SurfaceError> {
        match command {
            CameraCommand::EaseTo {
                center,
                zoom,
                pitch,
                bearing,
                duration,
            } => {
                let mut opts = json!({ "duration": duration.as_millis() as u64 });
                if let Some(c) = center {
                    opts["center"] = json!([c.lng, c.lat]);
                }
                if let Some(z) = zoom {
                    opts["zoom"] = json!(z);
                }
                if let Some(p) = pitch {
                    opts["pitch"] = json!(p);
                }
                if let Some(b) = bearing {
                    opts["bearing"] = json!(b);
                }
                self.map.ease_to(&to_js(&opts)?).map_err(backend)
            }
            CameraCommand::FitBounds {
                bounds,
                padding,
                duration,
            } => {
                let b = json!(bounds.corners());
                let opts = json!({ "padding": padding, "duration": duration.as_millis() as u64 });
                self.map.fit_bounds(&to_js(&b)?, &to_js(&opts)?).map_err(backend)
            }
        }
    }

    fn set_terrain(&self, source: &str, exaggeration: f64) -> Result<(), SurfaceError> {
        let spec = json!({ "source": source, "exaggeration": exaggeration });
        self.map.set_terrain(&to_js(&spec)?).map_err(backend)
    }

    fn resize(&self) -> Result<(), SurfaceError> {
        self.map.resize().map_err(backend)
    }
}
