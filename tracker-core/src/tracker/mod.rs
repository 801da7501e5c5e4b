//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod clock;
pub mod grid;
pub mod location;
pub mod replay;
pub mod tracker;
pub mod view;

#[cfg(test)]
mod grid_test;
#[cfg(test)]
mod tracker_test;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::grid::enumerate_grid;
pub use self::location::{LocationError, LocationService, PositionFix, PushedLocation};
pub use self::replay::{read_fixes, replay, ReplaySummary};
pub use self::tracker::{Toggles, Tracker, TrackerSettings, TrackingState};
pub use self::view::{MapView, RenderEvent, RenderQueue};
