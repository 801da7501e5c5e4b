//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//!Slippy map tile calculations (Web Mercator, XYZ addressing)

use std::f64::consts;

/// Latitude limit of the Web Mercator tiling scheme
pub const MAX_LATITUDE: f64 = 85.0511287798066;

/// Geographic extent in degrees (minx: west, miny: south, maxx: east, maxy: north)
#[derive(PartialEq, Clone, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.minx && lon <= self.maxx && lat >= self.miny && lat <= self.maxy
    }
    /// Grow extent to include point
    pub fn expand(&mut self, lon: f64, lat: f64) {
        self.minx = self.minx.min(lon);
        self.miny = self.miny.min(lat);
        self.maxx = self.maxx.max(lon);
        self.maxy = self.maxy.max(lat);
    }
}

/// Min and max grid cell numbers (max values are exclusive)
#[derive(PartialEq, Clone, Debug)]
pub struct ExtentInt {
    pub minx: u32,
    pub miny: u32,
    pub maxx: u32,
    pub maxy: u32,
}

impl ExtentInt {
    /// Number of cells covered
    pub fn count(&self) -> u64 {
        let w = self.maxx.saturating_sub(self.minx) as u64;
        let h = self.maxy.saturating_sub(self.miny) as u64;
        w * h
    }
}

/// Number of tiles per axis
pub fn level_size(zoom: u8) -> f64 {
    (zoom as f64).exp2()
}

/// Tile index `(x, y)` containing a WGS84 position.
///
/// Only defined for latitudes within +/-85.05 degrees. Outside this range
/// the projection runs off the grid and the result is meaningless.
pub fn lonlat_to_tile(lon: f64, lat: f64, zoom: u8) -> (u32, u32) {
    let n = level_size(zoom);
    let x = ((lon + 180.0) / 360.0 * n).floor();
    let lat_rad = lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / consts::PI) / 2.0 * n).floor();
    (x as u32, y as u32)
}

/// Latitude of the northern edge of tile row `y`
fn tile_lat(y: f64, n: f64) -> f64 {
    (consts::PI * (1.0 - 2.0 * y / n))
        .sinh()
        .atan()
        .to_degrees()
}

/// Geographic extent of a tile in XYZ adressing scheme
pub fn tile_bounds(xtile: u32, ytile: u32, zoom: u8) -> Extent {
    let n = level_size(zoom);
    Extent {
        minx: xtile as f64 / n * 360.0 - 180.0,
        miny: tile_lat(ytile as f64 + 1.0, n),
        maxx: (xtile as f64 + 1.0) / n * 360.0 - 180.0,
        maxy: tile_lat(ytile as f64, n),
    }
}

/// Tile index limits covering extent
pub fn tile_limits(extent: &Extent, zoom: u8) -> ExtentInt {
    let level_max = level_size(zoom) as u32;
    // keep corners on the grid
    let west = extent.minx.max(-180.0);
    let east = extent.maxx.min(180.0);
    let north = extent.maxy.min(MAX_LATITUDE);
    let south = extent.miny.max(-MAX_LATITUDE);
    if west > east || south > north {
        return ExtentInt {
            minx: 0,
            miny: 0,
            maxx: 0,
            maxy: 0,
        };
    }
    let (minx, miny) = lonlat_to_tile(west, north, zoom);
    let (maxx, maxy) = lonlat_to_tile(east, south, zoom);
    // east edge at +180 and south edge at the latitude limit fall on the next level row/column
    ExtentInt {
        minx: minx.min(level_max - 1),
        miny: miny.min(level_max - 1),
        maxx: maxx.saturating_add(1).min(level_max),
        maxy: maxy.saturating_add(1).min(level_max),
    }
}
