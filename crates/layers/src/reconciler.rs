use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

use catalog::PlaceCatalog;
use formats::PlaceGeometry;
use foundation::{Aabb2, PlaceId};
use runtime::{Debouncer, Event, EventBus, PassEvent, PassTicket};
use scene::Selection;
use tracing::{debug, warn};

use crate::overlay::{OverlayHandle, OverlayRegistry, install_overlay, teardown_overlay};
use crate::surface::{MapSurface, SurfaceError};

/// Selection edits closer together than this collapse into one pass.
pub const RECONCILE_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Status { path: String, status: u16 },
    Network(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status { path, status } => write!(f, "GET {path} returned {status}"),
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Loads a place's boundary GeoJSON by path.
#[allow(async_fn_in_trait)]
pub trait GeometryFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Everything a pass reconciles against.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub selection: &'a Selection,
    pub catalog: &'a PlaceCatalog,
    pub map_ready: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassSummary {
    pub removed: Vec<PlaceId>,
    pub added: Vec<PlaceId>,
    /// Selected places whose geometry could not be fetched, parsed or installed.
    pub failed: Vec<PlaceId>,
    /// Selected ids missing from the catalog.
    pub unknown: Vec<PlaceId>,
    /// Bounds of the last overlay added; the caller fits the camera to it.
    pub fit: Option<Aabb2>,
}

impl PassSummary {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// The map has not loaded; nothing was touched.
    Deferred,
    /// A newer pass started; this one stopped before its next mutation.
    Superseded,
    /// The style could not be inspected; the next trigger retries.
    Interrupted(SurfaceError),
    Settled(PassSummary),
}

/// Keeps the place overlays on the map in line with the selection.
///
/// Passes are debounced and cooperative: scheduling a pass cancels the
/// previous ticket, and a pass checks its ticket before every mutation and
/// after every await. Interior state is never borrowed across an await, so
/// overlapping passes on one thread are safe.
#[derive(Debug)]
pub struct Reconciler {
    registry: RefCell<OverlayRegistry>,
    debouncer: RefCell<Debouncer>,
    bus: RefCell<EventBus>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_debounce(RECONCILE_DEBOUNCE)
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce(delay: Duration) -> Self {
        Self {
            registry: RefCell::new(OverlayRegistry::new()),
            debouncer: RefCell::new(Debouncer::new(delay)),
            bus: RefCell::new(EventBus::new()),
        }
    }

    /// Starts a new pass, superseding any pass still waiting or running.
    pub fn schedule(&self) -> PassTicket {
        self.debouncer.borrow_mut().trigger()
    }

    pub fn cancel_pending(&self) {
        self.debouncer.borrow_mut().cancel_pending();
    }

    pub fn is_current(&self, ticket: &PassTicket) -> bool {
        self.debouncer.borrow().is_current(ticket)
    }

    /// Places whose overlays are currently on the map, in id order.
    pub fn rendered(&self) -> Vec<PlaceId> {
        self.registry.borrow().complete_places()
    }

    pub fn drain_events(&self) -> Vec<Event> {
        self.bus.borrow_mut().drain()
    }

    /// Forgets every overlay without touching the map (the map itself went away).
    pub fn reset(&self) {
        self.cancel_pending();
        *self.registry.borrow_mut() = OverlayRegistry::new();
    }

    fn emit(&self, pass: u64, kind: PassEvent, message: impl Into<String>) {
        self.bus.borrow_mut().emit(pass, kind, message);
    }

    /// Schedules a pass, waits out the debounce window with `sleep`, then runs it.
    pub async fn debounced<S, F, Sl, SlFut>(
        &self,
        sleep: Sl,
        surface: &S,
        fetcher: &F,
        input: &ReconcileInput<'_>,
    ) -> PassOutcome
    where
        S: MapSurface + ?Sized,
        F: GeometryFetcher,
        Sl: FnOnce(Duration) -> SlFut,
        SlFut: Future<Output = ()>,
    {
        let ticket = self.schedule();
        sleep(ticket.delay).await;
        self.run(&ticket, surface, fetcher, input).await
    }

    /// Runs one pass for `ticket`. The debounce wait is the caller's business.
    pub async fn run<S, F>(
        &self,
        ticket: &PassTicket,
        surface: &S,
        fetcher: &F,
        input: &ReconcileInput<'_>,
    ) -> PassOutcome
    where
        S: MapSurface + ?Sized,
        F: GeometryFetcher,
    {
        let pass = ticket.generation;
        if !self.is_current(ticket) {
            self.emit(pass, PassEvent::Superseded, "superseded before start");
            return PassOutcome::Superseded;
        }
        if !input.map_ready {
            self.emit(pass, PassEvent::Deferred, "map not loaded");
            return PassOutcome::Deferred;
        }

        let mut summary = PassSummary::default();

        let stale = self.registry.borrow().stale(input.selection, input.catalog);
        for handle in stale {
            if ticket.token.is_cancelled() {
                return self.superseded(pass);
            }
            match teardown_overlay(surface, &handle) {
                Ok(()) => {
                    self.registry.borrow_mut().remove(&handle.place);
                    debug!(place = %handle.place, "overlay removed");
                    self.emit(pass, PassEvent::Removed, handle.place.as_str());
                    summary.removed.push(handle.place);
                }
                Err(SurfaceError::StyleNotReady) => return self.interrupted(pass, SurfaceError::StyleNotReady),
                Err(err) => {
                    // Stays registered so the next pass retries the teardown.
                    warn!(place = %handle.place, "overlay teardown failed: {err}");
                    self.emit(pass, PassEvent::RemoveFailed, format!("{}: {err}", handle.place));
                }
            }
        }

        for id in input.selection.iter() {
            if ticket.token.is_cancelled() {
                return self.superseded(pass);
            }
            if self.registry.borrow().is_complete(id) {
                continue;
            }
            let Some(place) = input.catalog.get(id) else {
                self.emit(pass, PassEvent::UnknownPlace, id.as_str());
                summary.unknown.push(id.clone());
                continue;
            };

            let fetched = fetcher.fetch(&place.geo_json_path).await;
            if ticket.token.is_cancelled() {
                return self.superseded(pass);
            }
            let geometry = match fetched
                .map_err(|e| e.to_string())
                .and_then(|raw| PlaceGeometry::from_json(&raw).map_err(|e| e.to_string()))
            {
                Ok(g) => g,
                Err(err) => {
                    warn!(place = %id, "failed to load geojson for {}: {err}", place.name);
                    self.emit(pass, PassEvent::LoadFailed, format!("{id}: {err}"));
                    summary.failed.push(id.clone());
                    continue;
                }
            };

            // Another pass may have rendered it while the fetch was in flight.
            if self.registry.borrow().is_complete(id) {
                continue;
            }
            let handle = OverlayHandle::for_place(id);
            let added = match install_overlay(surface, &handle, &geometry) {
                Ok(added) => added,
                Err(err) => {
                    if let Err(cleanup) = teardown_overlay(surface, &handle) {
                        // Parts may still be on the map; keep them tracked.
                        debug!(place = %id, "cleanup after failed install failed: {cleanup}");
                        self.registry.borrow_mut().insert_partial(handle);
                    }
                    if err == SurfaceError::StyleNotReady {
                        return self.interrupted(pass, err);
                    }
                    warn!(place = %id, "overlay install failed: {err}");
                    self.emit(pass, PassEvent::InstallFailed, format!("{id}: {err}"));
                    summary.failed.push(id.clone());
                    continue;
                }
            };
            self.registry.borrow_mut().insert(handle);
            if !added {
                self.emit(pass, PassEvent::Adopted, id.as_str());
                continue;
            }
            debug!(place = %id, "overlay added");
            self.emit(pass, PassEvent::Added, id.as_str());
            summary.added.push(id.clone());
            if let Some(bounds) = geometry.bounds() {
                summary.fit = Some(bounds);
            }
        }

        self.emit(
            pass,
            PassEvent::Settled,
            format!("+{} -{}", summary.added.len(), summary.removed.len()),
        );
        PassOutcome::Settled(summary)
    }

    /// Tears down every overlay now and cancels any pending pass.
    ///
    /// Overlays that fail to come down stay registered and are reported on the
    /// event bus; the caller schedules a pass to retry them.
    pub fn clear<S: MapSurface + ?Sized>(&self, surface: &S) -> Vec<PlaceId> {
        self.cancel_pending();
        let pass = self.debouncer.borrow().generation();
        let handles: Vec<OverlayHandle> = {
            let registry = self.registry.borrow();
            registry.places().iter().filter_map(|p| registry.get(p).cloned()).collect()
        };
        let mut removed = Vec::new();
        for handle in handles {
            match teardown_overlay(surface, &handle) {
                Ok(()) => {
                    self.registry.borrow_mut().remove(&handle.place);
                    self.emit(pass, PassEvent::Removed, handle.place.as_str());
                    removed.push(handle.place);
                }
                Err(err) => {
                    warn!(place = %handle.place, "overlay teardown failed: {err}");
                    self.emit(pass, PassEvent::RemoveFailed, format!("{}: {err}", handle.place));
                }
            }
        }
        removed
    }

    fn superseded(&self, pass: u64) -> PassOutcome {
        self.emit(pass, PassEvent::Superseded, "newer pass started");
        PassOutcome::Superseded
    }

    fn interrupted(&self, pass: u64, err: SurfaceError) -> PassOutcome {
        debug!("reconciliation interrupted: {err}");
        self.emit(pass, PassEvent::Interrupted, err.to_string());
        PassOutcome::Interrupted(err)
    }
}
