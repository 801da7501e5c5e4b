//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Rendering collaborator

use crate::core::tile::TileId;
use serde_json::Value;
use tile_grid::Extent;

/// Map display driven by the tracker
pub trait MapView {
    /// Move (or create) the live position marker
    fn set_marker(&mut self, lat: f64, lon: f64);
    fn append_trace(&mut self, lat: f64, lon: f64);
    /// Center on position with fixed zoom
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8);
    /// Center on position keeping the zoom level
    fn pan_to(&mut self, lat: f64, lon: f64);
    fn fit_bounds(&mut self, bounds: &Extent);
    /// Replace the highlighted outline of the tile containing the position
    fn set_current_tile(&mut self, id: &TileId, bounds: &Extent);
    fn add_visited_tile(&mut self, id: &TileId, bounds: &Extent);
    fn clear_visited_tiles(&mut self);
    /// Replace all grid cells
    fn draw_grid(&mut self, cells: &[(TileId, Extent)]);
    fn clear_grid(&mut self);
    /// Replace the imported overlay (GeoJSON)
    fn show_overlay(&mut self, overlay: &Value);
    fn set_status(&mut self, text: &str);
    /// Blocking user notification
    fn alert(&mut self, text: &str);
    /// Reflect the auto-centering toggle state
    fn set_auto_center(&mut self, enabled: bool);
}

/// Bounding box as `[west, south, east, north]`
pub type BBox = [f64; 4];

pub fn bbox(extent: &Extent) -> BBox {
    [extent.minx, extent.miny, extent.maxx, extent.maxy]
}

/// Recorded view instruction
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    Marker { lat: f64, lon: f64 },
    TracePoint { lat: f64, lon: f64 },
    SetView { lat: f64, lon: f64, zoom: u8 },
    PanTo { lat: f64, lon: f64 },
    FitBounds { bbox: BBox },
    CurrentTile { id: String, bbox: BBox },
    VisitedTile { id: String, bbox: BBox },
    ClearVisited,
    Grid { cells: Vec<BBox> },
    ClearGrid,
    Overlay { geojson: Value },
    Status { text: String },
    Alert { text: String },
    AutoCenter { enabled: bool },
    /// Show or hide the install button
    InstallAvailable { available: bool },
    /// Show the deferred install prompt
    InstallPrompt,
}

/// View recording all instructions for later replay by a client
#[derive(Default)]
pub struct RenderQueue {
    events: Vec<RenderEvent>,
}

impl RenderQueue {
    pub fn new() -> RenderQueue {
        RenderQueue::default()
    }
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }
    /// Take all recorded events
    pub fn drain(&mut self) -> Vec<RenderEvent> {
        self.events.drain(..).collect()
    }
    fn push(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

impl MapView for RenderQueue {
    fn set_marker(&mut self, lat: f64, lon: f64) {
        self.push(RenderEvent::Marker { lat, lon });
    }
    fn append_trace(&mut self, lat: f64, lon: f64) {
        self.push(RenderEvent::TracePoint { lat, lon });
    }
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8) {
        self.push(RenderEvent::SetView { lat, lon, zoom });
    }
    fn pan_to(&mut self, lat: f64, lon: f64) {
        self.push(RenderEvent::PanTo { lat, lon });
    }
    fn fit_bounds(&mut self, bounds: &Extent) {
        self.push(RenderEvent::FitBounds {
            bbox: bbox(bounds),
        });
    }
    fn set_current_tile(&mut self, id: &TileId, bounds: &Extent) {
        self.push(RenderEvent::CurrentTile {
            id: id.to_string(),
            bbox: bbox(bounds),
        });
    }
    fn add_visited_tile(&mut self, id: &TileId, bounds: &Extent) {
        self.push(RenderEvent::VisitedTile {
            id: id.to_string(),
            bbox: bbox(bounds),
        });
    }
    fn clear_visited_tiles(&mut self) {
        self.push(RenderEvent::ClearVisited);
    }
    fn draw_grid(&mut self, cells: &[(TileId, Extent)]) {
        let cells = cells.iter().map(|(_, bounds)| bbox(bounds)).collect();
        self.push(RenderEvent::Grid { cells });
    }
    fn clear_grid(&mut self) {
        self.push(RenderEvent::ClearGrid);
    }
    fn show_overlay(&mut self, overlay: &Value) {
        self.push(RenderEvent::Overlay {
            geojson: overlay.clone(),
        });
    }
    fn set_status(&mut self, text: &str) {
        self.push(RenderEvent::Status {
            text: text.to_string(),
        });
    }
    fn alert(&mut self, text: &str) {
        self.push(RenderEvent::Alert {
            text: text.to_string(),
        });
    }
    fn set_auto_center(&mut self, enabled: bool) {
        self.push(RenderEvent::AutoCenter { enabled });
    }
}
