//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Recorded location tracks

use crate::store::Storage;
use crate::tracker::clock::ManualClock;
use crate::tracker::location::PositionFix;
use crate::tracker::tracker::Tracker;
use crate::tracker::view::MapView;
use std::io::{self, BufRead};

/// Parse one recorded fix: a JSON object or `lat,lon[,accuracy[,timestamp]]`
pub fn parse_fix(line: &str) -> Result<PositionFix, String> {
    let line = line.trim();
    if line.starts_with('{') {
        return serde_json::from_str(line).map_err(|e| e.to_string());
    }
    let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
    if fields.len() < 2 {
        return Err(format!("Expected `lat,lon` in `{}`", line));
    }
    let number = |idx: usize| -> Result<Option<f64>, String> {
        match fields.get(idx) {
            Some(v) if !v.is_empty() => v
                .parse::<f64>()
                .map(Some)
                .map_err(|e| format!("`{}`: {}", v, e)),
            _ => Ok(None),
        }
    };
    Ok(PositionFix {
        latitude: number(0)?.unwrap_or_default(),
        longitude: number(1)?.unwrap_or_default(),
        accuracy: number(2)?.unwrap_or_default(),
        timestamp: number(3)?.map(|ts| ts as u64),
    })
}

/// Read fixes, one per line. Empty lines, comments and unparsable lines are skipped.
pub fn read_fixes<R: BufRead>(reader: R) -> Result<Vec<PositionFix>, io::Error> {
    let mut fixes = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_fix(&line) {
            Ok(fix) => fixes.push(fix),
            Err(e) => warn!("Skipping line {}: {}", lineno + 1, e),
        }
    }
    Ok(fixes)
}

#[derive(PartialEq, Debug)]
pub struct ReplaySummary {
    pub fixes: usize,
    pub accepted: usize,
    pub new_tiles: usize,
}

/// Feed recorded fixes into the tracker. Fix timestamps drive the clock,
/// fixes without timestamp are spaced by the minimal fix interval.
pub fn replay<S: Storage, V: MapView>(
    tracker: &mut Tracker<S, V>,
    clock: &ManualClock,
    fixes: &[PositionFix],
) -> ReplaySummary {
    let visited_before = tracker.visited().len();
    let interval = tracker.settings().min_fix_interval;
    tracker.start();
    let mut accepted = 0;
    for fix in fixes {
        match fix.timestamp {
            Some(ts) => clock.set(ts),
            None => clock.advance(interval),
        }
        if tracker.on_fix(fix) {
            accepted += 1;
        }
    }
    tracker.stop();
    ReplaySummary {
        fixes: fixes.len(),
        accepted,
        new_tiles: tracker.visited().len().saturating_sub(visited_before),
    }
}
