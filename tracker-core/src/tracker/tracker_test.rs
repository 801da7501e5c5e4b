//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::capability::WakeLock;
use crate::core::tile::TileId;
use crate::store::{MemoryStorage, Storage, VisitedTiles};
use crate::tracker::clock::ManualClock;
use crate::tracker::location::{
    LocationError, LocationService, PositionFix, PushedLocation, SubscriptionId,
};
use crate::tracker::tracker::{Toggles, Tracker, TrackerSettings, TrackingState};
use crate::tracker::view::{RenderEvent, RenderQueue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tile_grid::Extent;

const KEY: &str = "visited_17";

struct Fixture {
    tracker: Tracker<MemoryStorage, RenderQueue>,
    storage: MemoryStorage,
    clock: ManualClock,
}

fn fixture_with(settings: TrackerSettings, storage: MemoryStorage) -> Fixture {
    let clock = ManualClock::new(1_000_000);
    let visited = VisitedTiles::new(storage.clone(), KEY);
    let tracker = Tracker::new(
        settings,
        visited,
        RenderQueue::new(),
        Box::new(PushedLocation::new()),
        Box::new(clock.clone()),
    );
    Fixture {
        tracker,
        storage,
        clock,
    }
}

fn fixture() -> Fixture {
    fixture_with(TrackerSettings::default(), MemoryStorage::new())
}

fn fix(lat: f64, lon: f64) -> PositionFix {
    PositionFix {
        latitude: lat,
        longitude: lon,
        accuracy: 4.6,
        timestamp: None,
    }
}

fn events(tracker: &mut Tracker<MemoryStorage, RenderQueue>) -> Vec<RenderEvent> {
    tracker.view_mut().drain()
}

fn count<F: Fn(&RenderEvent) -> bool>(events: &[RenderEvent], pred: F) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[derive(Clone, Default)]
struct CountingWakeLock {
    requests: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl WakeLock for CountingWakeLock {
    fn request(&mut self) -> Result<(), String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Err("NotAllowedError".to_string())
    }
    fn release(&mut self) -> Result<(), String> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct NoGeolocation;

impl LocationService for NoGeolocation {
    fn subscribe(&mut self) -> Result<SubscriptionId, LocationError> {
        Err(LocationError::Unsupported)
    }
    fn cancel(&mut self, _id: SubscriptionId) {}
}

#[test]
fn test_start_stop() {
    let mut f = fixture();
    assert_eq!(f.tracker.state(), TrackingState::Stopped);

    f.tracker.start();
    assert_eq!(f.tracker.state(), TrackingState::Tracking(1));
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::Status {
            text: "Requesting permission…".to_string()
        }]
    );

    // second start is a no-op
    f.tracker.start();
    assert_eq!(f.tracker.state(), TrackingState::Tracking(1));
    assert!(events(&mut f.tracker).is_empty());

    f.tracker.stop();
    assert!(!f.tracker.is_tracking());
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::Status {
            text: "GPS stopped".to_string()
        }]
    );

    f.tracker.start();
    assert_eq!(f.tracker.state(), TrackingState::Tracking(2));
}

#[test]
fn test_wake_lock_best_effort() {
    let wake_lock = CountingWakeLock::default();
    let f = fixture();
    let mut tracker = f.tracker.with_wake_lock(Box::new(wake_lock.clone()));

    // failing request does not prevent tracking
    tracker.start();
    assert!(tracker.is_tracking());
    assert_eq!(wake_lock.requests.load(Ordering::SeqCst), 1);

    tracker.on_visibility_change(false);
    assert_eq!(wake_lock.requests.load(Ordering::SeqCst), 1);
    tracker.on_visibility_change(true);
    assert_eq!(wake_lock.requests.load(Ordering::SeqCst), 2);

    tracker.stop();
    assert_eq!(wake_lock.releases.load(Ordering::SeqCst), 1);
    tracker.on_visibility_change(true);
    assert_eq!(wake_lock.requests.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unsupported_location() {
    let storage = MemoryStorage::new();
    let mut tracker = Tracker::new(
        TrackerSettings::default(),
        VisitedTiles::new(storage, KEY),
        RenderQueue::new(),
        Box::new(NoGeolocation),
        Box::new(ManualClock::new(0)),
    );
    tracker.start();
    assert!(!tracker.is_tracking());
    let events = tracker.view_mut().drain();
    assert!(events.contains(&RenderEvent::Alert {
        text: "Geolocation not supported.".to_string()
    }));
}

#[test]
fn test_fix_while_stopped() {
    let mut f = fixture();
    assert!(!f.tracker.on_fix(&fix(55.676, 12.568)));
    assert!(f.tracker.visited().is_empty());
    assert!(events(&mut f.tracker).is_empty());
}

#[test]
fn test_debounce() {
    let mut f = fixture();
    f.tracker.start();
    assert!(f.tracker.on_fix(&fix(55.676, 12.568)));

    f.clock.advance(500);
    assert!(!f.tracker.on_fix(&fix(55.677, 12.569)));
    assert_eq!(f.tracker.position(), Some((55.676, 12.568)));

    // interval is measured from the last accepted fix
    f.clock.advance(400);
    assert!(f.tracker.on_fix(&fix(55.678, 12.570)));

    f.clock.advance(900);
    assert!(f.tracker.on_fix(&fix(55.679, 12.571)));
    assert_eq!(f.tracker.trace().len(), 3);
}

#[test]
fn test_fix_visits_tile() {
    let mut f = fixture();
    f.tracker.start();
    events(&mut f.tracker);

    assert!(f.tracker.on_fix(&fix(55.676, 12.568)));
    let id = TileId::new(17, 70111, 41025);
    assert_eq!(f.tracker.current_tile(), Some(id));
    assert!(f.tracker.visited().has(&id));
    assert_eq!(f.tracker.visited().len(), 1);
    assert_eq!(
        f.storage.read(KEY),
        Some(r#"["17/70111/41025"]"#.to_string())
    );

    let bbox = [
        id.bounds().minx,
        id.bounds().miny,
        id.bounds().maxx,
        id.bounds().maxy,
    ];
    assert_eq!(
        events(&mut f.tracker),
        vec![
            RenderEvent::Marker {
                lat: 55.676,
                lon: 12.568
            },
            RenderEvent::TracePoint {
                lat: 55.676,
                lon: 12.568
            },
            RenderEvent::Status {
                text: "Fix: ±5 m".to_string()
            },
            RenderEvent::PanTo {
                lat: 55.676,
                lon: 12.568
            },
            RenderEvent::CurrentTile {
                id: id.to_string(),
                bbox
            },
            RenderEvent::VisitedTile {
                id: id.to_string(),
                bbox
            },
            RenderEvent::ClearGrid,
        ]
    );

    let geojson = f.tracker.export_visited();
    let features = geojson["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["id"], "17/70111/41025");
}

#[test]
fn test_same_tile_twice() {
    let mut f = fixture();
    f.tracker.start();
    f.tracker.on_fix(&fix(55.676, 12.568));
    f.clock.advance(1000);
    f.tracker.on_fix(&fix(55.6761, 12.5681));

    assert_eq!(f.tracker.visited().len(), 1);
    assert_eq!(f.storage.write_count(), 1);
    let evts = events(&mut f.tracker);
    assert_eq!(
        count(&evts, |e| matches!(e, RenderEvent::VisitedTile { .. })),
        1
    );
    assert_eq!(
        count(&evts, |e| matches!(e, RenderEvent::CurrentTile { .. })),
        2
    );
}

#[test]
fn test_centering_modes() {
    let mut f = fixture();
    f.tracker.start();

    let mut toggles = f.tracker.toggles();
    toggles.snap_zoom = true;
    toggles.show_trace = false;
    f.tracker.set_toggles(toggles);
    events(&mut f.tracker);

    f.tracker.on_fix(&fix(55.676, 12.568));
    let evts = events(&mut f.tracker);
    assert!(evts.contains(&RenderEvent::SetView {
        lat: 55.676,
        lon: 12.568,
        zoom: 17
    }));
    assert_eq!(
        count(&evts, |e| matches!(e, RenderEvent::TracePoint { .. })),
        0
    );
    assert!(f.tracker.trace().is_empty());

    toggles.auto_center = false;
    f.tracker.set_toggles(toggles);
    f.clock.advance(1000);
    f.tracker.on_fix(&fix(55.677, 12.569));
    let evts = events(&mut f.tracker);
    assert_eq!(
        count(&evts, |e| matches!(
            e,
            RenderEvent::SetView { .. } | RenderEvent::PanTo { .. }
        )),
        0
    );
}

const KML: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
<Placemark><name>A</name><Point><coordinates>12.5,55.6</coordinates></Point></Placemark>
<Placemark><name>B</name><Point><coordinates>12.6,55.7</coordinates></Point></Placemark>
</Document></kml>"#;

fn recenter_count(evts: &[RenderEvent]) -> usize {
    count(evts, |e| {
        matches!(e, RenderEvent::SetView { .. } | RenderEvent::PanTo { .. })
    })
}

#[test]
fn test_import_pauses_auto_center() {
    let mut f = fixture();
    f.tracker.start();
    events(&mut f.tracker);

    f.tracker.import_overlay("squares.kml", KML.as_bytes()).unwrap();
    let evts = events(&mut f.tracker);
    assert!(matches!(evts[0], RenderEvent::Overlay { .. }));
    assert_eq!(
        evts[1],
        RenderEvent::FitBounds {
            bbox: [12.5, 55.6, 12.6, 55.7]
        }
    );
    assert_eq!(evts[2], RenderEvent::AutoCenter { enabled: false });
    assert!(!f.tracker.toggles().auto_center);

    f.clock.advance(1000);
    f.tracker.on_fix(&fix(55.676, 12.568));
    assert_eq!(recenter_count(&events(&mut f.tracker)), 0);

    // restore fires at the deadline
    f.clock.advance(5000);
    f.tracker.poll_timers();
    assert!(f.tracker.toggles().auto_center);
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::AutoCenter { enabled: true }]
    );

    f.tracker.on_fix(&fix(55.677, 12.569));
    assert_eq!(recenter_count(&events(&mut f.tracker)), 1);
}

#[test]
fn test_manual_toggle_cancels_restore() {
    let mut f = fixture();
    f.tracker.import_overlay("squares.kml", KML.as_bytes()).unwrap();
    assert!(!f.tracker.toggles().auto_center);

    // user clicks the map twice: on, then off again
    f.clock.advance(1000);
    f.tracker.toggle_auto_center();
    f.tracker.toggle_auto_center();
    assert!(!f.tracker.toggles().auto_center);
    events(&mut f.tracker);

    f.clock.advance(10000);
    f.tracker.poll_timers();
    assert!(!f.tracker.toggles().auto_center);
    assert!(events(&mut f.tracker).is_empty());
}

#[test]
fn test_repeated_import_keeps_original_toggle() {
    let mut f = fixture();
    f.tracker.import_overlay("a.kml", KML.as_bytes()).unwrap();
    f.clock.advance(3000);
    f.tracker.import_overlay("b.kml", KML.as_bytes()).unwrap();

    // first deadline passed, second pending
    f.clock.advance(4000);
    f.tracker.poll_timers();
    assert!(!f.tracker.toggles().auto_center);

    f.clock.advance(2000);
    f.tracker.poll_timers();
    assert!(f.tracker.toggles().auto_center);
}

#[test]
fn test_failed_import() {
    let mut f = fixture();
    f.tracker.start();
    events(&mut f.tracker);

    assert!(f.tracker.import_overlay("broken.kmz", b"garbage").is_err());
    let evts = events(&mut f.tracker);
    assert_eq!(evts.len(), 1);
    match &evts[0] {
        RenderEvent::Alert { text } => {
            assert!(text.starts_with("Could not read the KML/KMZ file."))
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(f.tracker.toggles().auto_center);
}

#[test]
fn test_location_error_keeps_tracking() {
    let mut f = fixture();
    f.tracker.start();
    events(&mut f.tracker);
    f.tracker.on_location_error(&LocationError::Timeout);
    assert!(f.tracker.is_tracking());
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::Status {
            text: "Timeout expired".to_string()
        }]
    );
    assert!(f.tracker.on_fix(&fix(55.676, 12.568)));
}

#[test]
fn test_grid_redraw() {
    let mut f = fixture();
    let id = TileId::new(17, 70111, 41025);
    let b = id.bounds();
    let viewport = Extent {
        minx: b.minx + 0.0001,
        miny: b.miny + 0.0001,
        maxx: b.maxx - 0.0001,
        maxy: b.maxy - 0.0001,
    };

    f.tracker.on_viewport_changed(viewport);
    assert_eq!(events(&mut f.tracker), vec![RenderEvent::ClearGrid]);

    let mut toggles = f.tracker.toggles();
    toggles.show_grid = true;
    f.tracker.set_toggles(toggles);
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::Grid {
            cells: vec![[b.minx, b.miny, b.maxx, b.maxy]]
        }]
    );

    // grid follows each accepted fix
    f.tracker.start();
    events(&mut f.tracker);
    f.tracker.on_fix(&fix(55.676, 12.568));
    let evts = events(&mut f.tracker);
    assert!(matches!(evts.last(), Some(RenderEvent::Grid { .. })));
}

#[test]
fn test_restore_visited_on_start() {
    let storage = MemoryStorage::new();
    storage
        .write(KEY, r#"["17/70111/41025", "17/70112/41025"]"#)
        .unwrap();
    let mut f = fixture_with(TrackerSettings::default(), storage);
    let evts = events(&mut f.tracker);
    assert_eq!(
        count(&evts, |e| matches!(e, RenderEvent::VisitedTile { .. })),
        2
    );
    assert_eq!(f.tracker.visited().len(), 2);
}

#[test]
fn test_clear_visited() {
    let mut f = fixture();
    f.tracker.start();
    f.tracker.on_fix(&fix(55.676, 12.568));
    events(&mut f.tracker);

    f.tracker.clear_visited();
    assert!(f.tracker.visited().is_empty());
    assert_eq!(f.storage.read(KEY), Some("[]".to_string()));
    assert_eq!(events(&mut f.tracker), vec![RenderEvent::ClearVisited]);
    assert!(f.tracker.export_visited()["features"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_center_on_position() {
    let mut f = fixture();
    f.tracker.center_on_position();
    assert!(events(&mut f.tracker).is_empty());

    f.tracker.start();
    f.tracker.on_fix(&fix(55.676, 12.568));
    events(&mut f.tracker);
    f.tracker.center_on_position();
    assert_eq!(
        events(&mut f.tracker),
        vec![RenderEvent::SetView {
            lat: 55.676,
            lon: 12.568,
            zoom: 17
        }]
    );
}

#[test]
fn test_reset() {
    let mut f = fixture();
    f.tracker.start();
    f.tracker.on_fix(&fix(55.676, 12.568));
    f.tracker.set_toggles(Toggles {
        auto_center: false,
        snap_zoom: true,
        show_trace: true,
        show_grid: true,
    });

    f.tracker.reset();
    assert!(!f.tracker.is_tracking());
    assert!(f.tracker.trace().is_empty());
    assert_eq!(f.tracker.position(), None);
    assert_eq!(f.tracker.toggles(), TrackerSettings::default().toggles);
    // visited tiles survive
    assert_eq!(f.tracker.visited().len(), 1);

    // debounce state is gone too
    f.tracker.start();
    assert!(f.tracker.on_fix(&fix(55.676, 12.568)));
}

#[test]
fn test_pushed_location() {
    let mut location = PushedLocation::new();
    assert!(!location.is_active());
    let id = location.subscribe().unwrap();
    assert!(location.is_active());
    location.cancel(id + 1);
    assert!(location.is_active());
    location.cancel(id);
    assert!(!location.is_active());
}

#[test]
fn test_location_error_codes() {
    assert_eq!(
        LocationError::from_code(1, None),
        LocationError::PermissionDenied
    );
    assert_eq!(LocationError::from_code(3, None).to_string(), "Timeout expired");
    assert_eq!(
        LocationError::from_code(0, Some("Sensor busy".to_string())).to_string(),
        "Sensor busy"
    );
    assert_eq!(LocationError::from_code(0, None).to_string(), "GPS error");
}
