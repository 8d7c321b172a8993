use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use catalog::PlaceCatalog;
use console_error_panic_hook::set_once;
use foundation::PlaceId;
use layers::terrain::enable_terrain;
use layers::water::set_water_visible;
use layers::{MapSurface, PassOutcome, ReconcileInput, Reconciler};
use scene::{
    CameraCommand, CameraController, GeolocationOptions, LayoutState, PitchStep, Route,
    Selection, resolve_location,
};
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

mod geolocation;
mod mapbox;
mod net;

use geolocation::BrowserGeolocation;
use mapbox::{MapboxSurface, js_message};
use net::{HttpFetcher, fetch_catalog, fetch_public_config};

/// Client state owned by the page. Only touched from the UI thread; no
/// `RefCell` borrow is held across an await.
struct App {
    map: OnceCell<MapboxSurface>,
    map_ready: Cell<bool>,
    water_visible: Cell<bool>,
    catalog: RefCell<PlaceCatalog>,
    selection: RefCell<Selection>,
    camera: RefCell<CameraController>,
    layout: RefCell<LayoutState>,
    reconciler: Reconciler,
}

impl App {
    fn new() -> Self {
        Self {
            map: OnceCell::new(),
            map_ready: Cell::new(false),
            water_visible: Cell::new(false),
            catalog: RefCell::new(PlaceCatalog::new()),
            selection: RefCell::new(Selection::new()),
            camera: RefCell::new(CameraController::new()),
            layout: RefCell::new(LayoutState::new(viewport_width())),
            reconciler: Reconciler::new(),
        }
    }

    fn ready_map(&self) -> Option<&MapboxSurface> {
        if self.map_ready.get() { self.map.get() } else { None }
    }

    fn apply_camera(&self, command: CameraCommand) {
        if let Some(map) = self.ready_map() {
            if let Err(err) = map.apply_camera(&command) {
                log(&format!("camera command failed: {err}"));
            }
        }
    }
}

thread_local! {
    static APP: Rc<App> = Rc::new(App::new());
}

fn app() -> Rc<App> {
    APP.with(Rc::clone)
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(1280.0)
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

async fn sleep(delay: Duration) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        match web_sys::window() {
            Some(window) => {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    &resolve,
                    delay.as_millis() as i32,
                );
            }
            None => {
                let _ = resolve.call0(&JsValue::NULL);
            }
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Schedules a debounced overlay pass. Inputs are read after the debounce
/// window so the pass sees the latest selection.
fn trigger_reconcile() {
    let app = app();
    let ticket = app.reconciler.schedule();
    spawn_local(async move {
        sleep(ticket.delay).await;
        if !app.reconciler.is_current(&ticket) {
            return;
        }
        let Some(map) = app.map.get() else {
            return;
        };
        let selection = app.selection.borrow().clone();
        let catalog = app.catalog.borrow().clone();
        let input = ReconcileInput {
            selection: &selection,
            catalog: &catalog,
            map_ready: app.map_ready.get(),
        };
        let outcome = app.reconciler.run(&ticket, map, &HttpFetcher, &input).await;
        report_pass(&app, &outcome);
    });
}

fn report_pass(app: &App, outcome: &PassOutcome) {
    for event in app.reconciler.drain_events() {
        if event.kind.is_failure() {
            log(&event.to_string());
        }
    }
    if let PassOutcome::Settled(summary) = outcome {
        if !summary.failed.is_empty() {
            log(&format!("{} place(s) could not be drawn", summary.failed.len()));
        }
        if let Some(bounds) = summary.fit {
            let command = app.camera.borrow_mut().fit_bounds(bounds);
            app.apply_camera(command);
        }
    }
}

fn on_map_load() {
    let app = app();
    let Some(map) = app.map.get() else {
        return;
    };
    if let Err(err) = enable_terrain(map) {
        log(&format!("terrain setup failed: {err}"));
    }
    app.map_ready.set(true);
    if app.water_visible.get() {
        if let Err(err) = set_water_visible(map, true) {
            log(&format!("water layer failed: {err}"));
        }
    }
    trigger_reconcile();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Fetches the public config and creates the map inside `container_id`.
/// Without an access token the map stays uninitialized.
#[wasm_bindgen]
pub fn init_map(container_id: String) {
    spawn_local(async move {
        if let Err(err) = init_map_inner(&container_id).await {
            log(&format!("map init error: {}", js_message(&err)));
        }
    });
}

async fn init_map_inner(container: &str) -> Result<(), JsValue> {
    let app = app();
    if app.map.get().is_some() {
        return Ok(());
    }
    let config = fetch_public_config().await?;
    let Some(token) = config.access_token() else {
        log("mapbox access token is not configured; map not initialized");
        return Ok(());
    };

    let home = *app.camera.borrow().state();
    let surface = MapboxSurface::create(container, token, home.center, home.zoom)?;
    let on_load = Closure::<dyn Fn()>::new(on_map_load);
    surface.map().on("load", on_load.as_ref().unchecked_ref());
    on_load.forget();

    if app.map.set(surface).is_err() {
        log("map was initialized twice; keeping the first instance");
    }
    Ok(())
}

/// Loads `locations.json` and returns the flattened places as JSON.
#[wasm_bindgen]
pub async fn load_places() -> Result<String, JsValue> {
    let catalog = fetch_catalog().await?;
    let json = serde_json::to_string(catalog.places()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    *app().catalog.borrow_mut() = catalog;
    trigger_reconcile();
    Ok(json)
}

/// Replaces the selection with a comma-separated id list.
#[wasm_bindgen]
pub fn set_selection(ids: &str) {
    let changed = app().selection.borrow_mut().set(Selection::from_comma_list(ids));
    if changed {
        trigger_reconcile();
    }
}

#[wasm_bindgen]
pub fn toggle_place(id: &str) {
    app().selection.borrow_mut().toggle(PlaceId::new(id));
    trigger_reconcile();
}

/// Empties the selection and removes every overlay immediately.
#[wasm_bindgen]
pub fn clear_selection() {
    let app = app();
    app.selection.borrow_mut().clear();
    match app.map.get() {
        Some(map) => {
            app.reconciler.clear(map);
        }
        None => app.reconciler.cancel_pending(),
    }
    // Anything that failed to come down is retried by a regular pass.
    trigger_reconcile();
}

#[wasm_bindgen]
pub fn selection_label() -> String {
    let app = app();
    let selection = app.selection.borrow();
    app.catalog.borrow().label_for(selection.ids())
}

#[wasm_bindgen]
pub fn set_water_layer(visible: bool) {
    let app = app();
    app.water_visible.set(visible);
    if let Some(map) = app.ready_map() {
        if let Err(err) = set_water_visible(map, visible) {
            log(&format!("water layer failed: {err}"));
        }
    }
}

#[wasm_bindgen]
pub fn camera_reset() {
    let app = app();
    let command = app.camera.borrow_mut().reset();
    app.apply_camera(command);
}

#[wasm_bindgen]
pub fn camera_set_pitch(degrees: u32) -> Result<(), JsValue> {
    let step = PitchStep::from_degrees(degrees)
        .ok_or_else(|| JsValue::from_str(&format!("unsupported pitch {degrees}")))?;
    let app = app();
    let command = app.camera.borrow_mut().set_pitch(step, now_ms());
    app.apply_camera(command);
    Ok(())
}

#[wasm_bindgen]
pub fn camera_pitch() -> u32 {
    app().camera.borrow().pitch().degrees()
}

#[wasm_bindgen]
pub fn camera_is_manual_pitch() -> bool {
    app().camera.borrow().is_manual_pitch(now_ms())
}

/// Flips the sidebar and resizes the map once the drawer animation settles.
#[wasm_bindgen]
pub fn toggle_sidebar() -> bool {
    let app = app();
    let (open, delay) = {
        let mut layout = app.layout.borrow_mut();
        let delay = layout.toggle_sidebar();
        (layout.sidebar_open(), delay)
    };
    spawn_local(async move {
        sleep(delay).await;
        resize_map();
    });
    open
}

#[wasm_bindgen]
pub fn resize_map() {
    if let Some(map) = app().map.get() {
        if let Err(err) = map.resize() {
            log(&format!("map resize failed: {err}"));
        }
    }
}

#[wasm_bindgen]
pub fn set_viewport_width(width_px: f64) {
    app().layout.borrow_mut().set_viewport_width(width_px);
}

#[wasm_bindgen]
pub fn toggle_controls() -> bool {
    let app = app();
    let mut layout = app.layout.borrow_mut();
    layout.toggle_controls();
    layout.controls_open()
}

#[wasm_bindgen]
pub fn controls_open() -> bool {
    app().layout.borrow().controls_open()
}

#[wasm_bindgen]
pub fn main_width_css() -> String {
    app().layout.borrow().main_width_css()
}

/// Title of the page at `path`, or `None` for unknown routes.
#[wasm_bindgen]
pub fn route_title(path: &str) -> Option<String> {
    Route::from_path(path).map(|r| r.title().to_string())
}

/// Resolves the weather view location once and returns
/// `{ lat, lng, embedUrl, notice }` as JSON.
#[wasm_bindgen]
pub async fn resolve_weather() -> Result<String, JsValue> {
    let location = resolve_location(&BrowserGeolocation, &GeolocationOptions::default()).await;
    if let Some(notice) = &location.notice {
        log(notice);
    }
    let body = json!({
        "lat": location.coords.lat,
        "lng": location.coords.lng,
        "embedUrl": location.embed_url(),
        "notice": location.notice,
    });
    Ok(body.to_string())
}
