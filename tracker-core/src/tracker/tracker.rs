//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Position stream handler

use crate::capability::WakeLock;
use crate::core::config::{ApplicationCfg, TogglesCfg};
use crate::core::tile::TileId;
use crate::core::Config;
use crate::import::{self, ImportError};
use crate::store::{Storage, VisitedTiles};
use crate::tracker::clock::Clock;
use crate::tracker::grid::enumerate_grid;
use crate::tracker::location::{LocationError, LocationService, PositionFix, SubscriptionId};
use crate::tracker::view::MapView;
use serde_json::Value;
use tile_grid::Extent;

/// Display toggles of the map panel
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Debug)]
pub struct Toggles {
    pub auto_center: bool,
    pub snap_zoom: bool,
    pub show_trace: bool,
    pub show_grid: bool,
}

impl From<&TogglesCfg> for Toggles {
    fn from(cfg: &TogglesCfg) -> Self {
        Toggles {
            auto_center: cfg.auto_center,
            snap_zoom: cfg.snap_zoom,
            show_trace: cfg.show_trace,
            show_grid: cfg.show_grid,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrackerSettings {
    /// Zoom level of visited tiles
    pub zoom: u8,
    /// Minimal interval between processed fixes (ms)
    pub min_fix_interval: u64,
    /// Auto-centering pause after imports (ms)
    pub autocenter_pause: u64,
    pub snap_zoom: u8,
    pub max_grid_tiles: usize,
    pub toggles: Toggles,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        TrackerSettings {
            zoom: 17,
            min_fix_interval: 800,
            autocenter_pause: 6000,
            snap_zoom: 17,
            max_grid_tiles: 500,
            toggles: Toggles::from(&TogglesCfg::default()),
        }
    }
}

impl<'a> Config<'a, ApplicationCfg> for TrackerSettings {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let cfg = &config.tracker;
        if cfg.zoom > 30 || cfg.snap_zoom > 30 {
            return Err(format!("Zoom level {} out of range", cfg.zoom.max(cfg.snap_zoom)));
        }
        Ok(TrackerSettings {
            zoom: cfg.zoom,
            min_fix_interval: cfg.min_fix_interval,
            autocenter_pause: cfg.autocenter_pause,
            snap_zoom: cfg.snap_zoom,
            max_grid_tiles: config.grid.max_tiles,
            toggles: Toggles::from(&cfg.toggles),
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[tracker]
# Zoom level of visited tiles
zoom = 17
# Drop fixes arriving faster than this (milliseconds)
min_fix_interval = 800
# Suspend auto-centering after an overlay import (milliseconds)
autocenter_pause = 6000
snap_zoom = 17

[tracker.toggles]
auto_center = true
snap_zoom = false
show_trace = true
show_grid = false

[grid]
max_tiles = 500
"#;
        toml.to_string()
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum TrackingState {
    Stopped,
    Tracking(SubscriptionId),
}

/// Scheduled restore of the auto-centering toggle
#[derive(Clone, Copy, Debug)]
struct PendingRestore {
    deadline: u64,
    auto_center: bool,
}

pub struct Tracker<S: Storage, V: MapView> {
    settings: TrackerSettings,
    toggles: Toggles,
    visited: VisitedTiles<S>,
    view: V,
    location: Box<dyn LocationService + Send>,
    wake_lock: Option<Box<dyn WakeLock + Send>>,
    clock: Box<dyn Clock + Send>,
    state: TrackingState,
    last_fix: Option<u64>,
    position: Option<(f64, f64)>,
    trace: Vec<(f64, f64)>,
    current_tile: Option<TileId>,
    viewport: Option<Extent>,
    autocenter_paused_until: u64,
    pending_restore: Option<PendingRestore>,
}

impl<S: Storage, V: MapView> Tracker<S, V> {
    /// Create tracker and render all previously visited tiles
    pub fn new(
        settings: TrackerSettings,
        visited: VisitedTiles<S>,
        view: V,
        location: Box<dyn LocationService + Send>,
        clock: Box<dyn Clock + Send>,
    ) -> Tracker<S, V> {
        let mut tracker = Tracker {
            toggles: settings.toggles,
            settings,
            visited,
            view,
            location,
            wake_lock: None,
            clock,
            state: TrackingState::Stopped,
            last_fix: None,
            position: None,
            trace: Vec::new(),
            current_tile: None,
            viewport: None,
            autocenter_paused_until: 0,
            pending_restore: None,
        };
        for (id, bounds) in tracker.visited.export_features() {
            tracker.view.add_visited_tile(&id, &bounds);
        }
        tracker
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock + Send>) -> Self {
        self.wake_lock = Some(wake_lock);
        self
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }
    pub fn state(&self) -> TrackingState {
        self.state
    }
    pub fn is_tracking(&self) -> bool {
        self.state != TrackingState::Stopped
    }
    pub fn toggles(&self) -> Toggles {
        self.toggles
    }
    pub fn visited(&self) -> &VisitedTiles<S> {
        &self.visited
    }
    pub fn view(&self) -> &V {
        &self.view
    }
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
    /// Last processed position `(lat, lon)`
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }
    pub fn trace(&self) -> &[(f64, f64)] {
        &self.trace
    }
    pub fn current_tile(&self) -> Option<TileId> {
        self.current_tile
    }

    // --- Tracking state ---

    pub fn start(&mut self) {
        self.poll_timers();
        if self.is_tracking() {
            return;
        }
        match self.location.subscribe() {
            Ok(id) => {
                info!("Tracking started");
                self.view.set_status("Requesting permission…");
                self.state = TrackingState::Tracking(id);
                self.acquire_wake_lock();
            }
            Err(e) => {
                warn!("Location service unavailable: {}", e);
                self.view.set_status(&e.to_string());
                if e == LocationError::Unsupported {
                    self.view.alert(&e.to_string());
                }
            }
        }
    }

    pub fn stop(&mut self) {
        self.poll_timers();
        if let TrackingState::Tracking(id) = self.state {
            self.location.cancel(id);
            self.state = TrackingState::Stopped;
            info!("Tracking stopped");
            self.view.set_status("GPS stopped");
        }
        if let Some(ref mut wake_lock) = self.wake_lock {
            if let Err(e) = wake_lock.release() {
                debug!("Wake lock release failed: {}", e);
            }
        }
    }

    fn acquire_wake_lock(&mut self) {
        if let Some(ref mut wake_lock) = self.wake_lock {
            if let Err(e) = wake_lock.request() {
                debug!("Wake lock request failed: {}", e);
            }
        }
    }

    /// Page visibility changed. Wake locks are dropped by the platform when hidden.
    pub fn on_visibility_change(&mut self, visible: bool) {
        self.poll_timers();
        if visible && self.is_tracking() {
            self.acquire_wake_lock();
        }
    }

    // --- Position stream ---

    /// Process a location fix. Returns false if the fix was dropped.
    pub fn on_fix(&mut self, fix: &PositionFix) -> bool {
        self.poll_timers();
        if !self.is_tracking() {
            debug!("Ignoring fix while stopped");
            return false;
        }
        let now = self.clock.now_millis();
        if let Some(last) = self.last_fix {
            if now.saturating_sub(last) < self.settings.min_fix_interval {
                return false;
            }
        }
        self.last_fix = Some(now);

        let (lat, lon) = (fix.latitude, fix.longitude);
        self.position = Some((lat, lon));
        self.view.set_marker(lat, lon);
        if self.toggles.show_trace {
            self.trace.push((lat, lon));
            self.view.append_trace(lat, lon);
        }
        self.view
            .set_status(&format!("Fix: ±{} m", fix.accuracy.round() as i64));

        if self.toggles.auto_center && now >= self.autocenter_paused_until {
            if self.toggles.snap_zoom {
                self.view.set_view(lat, lon, self.settings.snap_zoom);
            } else {
                self.view.pan_to(lat, lon);
            }
        }

        let id = TileId::containing(lon, lat, self.settings.zoom);
        let bounds = id.bounds();
        self.current_tile = Some(id);
        self.view.set_current_tile(&id, &bounds);
        if self.visited.insert(id) {
            self.view.add_visited_tile(&id, &bounds);
        }

        self.redraw_grid();
        true
    }

    /// Errors do not stop tracking, the platform keeps retrying
    pub fn on_location_error(&mut self, err: &LocationError) {
        self.poll_timers();
        warn!("Location error: {}", err);
        self.view.set_status(&err.to_string());
    }

    // --- View ---

    pub fn on_viewport_changed(&mut self, viewport: Extent) {
        self.poll_timers();
        self.viewport = Some(viewport);
        self.redraw_grid();
    }

    /// Redraw grid cells of the current viewport
    pub fn redraw_grid(&mut self) {
        if !self.toggles.show_grid {
            self.view.clear_grid();
            return;
        }
        match self.viewport {
            Some(ref viewport) => {
                let cells = enumerate_grid(
                    viewport,
                    self.settings.zoom,
                    self.settings.max_grid_tiles,
                );
                self.view.draw_grid(&cells);
            }
            None => self.view.clear_grid(),
        }
    }

    /// Center view on the last position
    pub fn center_on_position(&mut self) {
        self.poll_timers();
        if let Some((lat, lon)) = self.position {
            self.view.set_view(lat, lon, self.settings.snap_zoom);
        }
    }

    /// Manual change of the auto-centering toggle. Cancels a pending restore.
    pub fn set_auto_center(&mut self, enabled: bool) {
        self.poll_timers();
        if self.pending_restore.take().is_some() {
            debug!("Auto-center restore cancelled");
        }
        self.toggles.auto_center = enabled;
        self.view.set_auto_center(enabled);
    }

    /// Map click
    pub fn toggle_auto_center(&mut self) {
        let enabled = !self.toggles.auto_center;
        self.set_auto_center(enabled);
    }

    pub fn set_toggles(&mut self, toggles: Toggles) {
        self.poll_timers();
        if toggles.auto_center != self.toggles.auto_center {
            self.set_auto_center(toggles.auto_center);
        }
        let grid_changed = toggles.show_grid != self.toggles.show_grid;
        self.toggles.snap_zoom = toggles.snap_zoom;
        self.toggles.show_trace = toggles.show_trace;
        self.toggles.show_grid = toggles.show_grid;
        if grid_changed {
            self.redraw_grid();
        }
    }

    /// Suspend auto-centering and restore the toggle after the pause
    pub fn pause_auto_center(&mut self) {
        let now = self.clock.now_millis();
        let deadline = now + self.settings.autocenter_pause;
        self.autocenter_paused_until = deadline;
        // keep the value from before the first pause
        let auto_center = match self.pending_restore {
            Some(pending) => pending.auto_center,
            None => self.toggles.auto_center,
        };
        self.pending_restore = Some(PendingRestore {
            deadline,
            auto_center,
        });
        if self.toggles.auto_center {
            self.toggles.auto_center = false;
            self.view.set_auto_center(false);
        }
    }

    /// Fire due timers
    pub fn poll_timers(&mut self) {
        let now = self.clock.now_millis();
        if let Some(pending) = self.pending_restore {
            if now >= pending.deadline {
                self.pending_restore = None;
                if self.toggles.auto_center != pending.auto_center {
                    self.toggles.auto_center = pending.auto_center;
                    self.view.set_auto_center(pending.auto_center);
                }
            }
        }
    }

    // --- Overlays and visited tiles ---

    /// Import a KML/KMZ overlay, replacing the previous one
    pub fn import_overlay(&mut self, file_name: &str, data: &[u8]) -> Result<(), ImportError> {
        self.poll_timers();
        let geojson = match import::read_overlay(file_name, data) {
            Ok(geojson) => geojson,
            Err(e) => {
                warn!("Import of '{}' failed: {}", file_name, e);
                self.view
                    .alert(&format!("Could not read the KML/KMZ file. {}", e));
                return Err(e);
            }
        };
        self.view.show_overlay(&geojson);
        if let Some(bounds) = import::overlay_bounds(&geojson) {
            self.view.fit_bounds(&bounds);
        }
        self.pause_auto_center();
        Ok(())
    }

    /// GeoJSON FeatureCollection of visited tiles
    pub fn export_visited(&self) -> Value {
        self.visited.to_geojson()
    }

    pub fn clear_visited(&mut self) {
        self.poll_timers();
        info!("Clearing {} visited tiles", self.visited.len());
        self.visited.clear();
        self.view.clear_visited_tiles();
    }

    /// Stop tracking and drop all transient state
    pub fn reset(&mut self) {
        if let TrackingState::Tracking(id) = self.state {
            self.location.cancel(id);
        }
        self.state = TrackingState::Stopped;
        self.toggles = self.settings.toggles;
        self.last_fix = None;
        self.position = None;
        self.trace.clear();
        self.current_tile = None;
        self.viewport = None;
        self.autocenter_paused_until = 0;
        self.pending_restore = None;
    }
}
