//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;
use tile_grid::{lonlat_to_tile, tile_bounds, Extent};

/// Highest zoom level with valid tile identifiers
pub const MAX_ZOOM: u8 = 30;

/// Slippy map tile identifier, serialized as `z/x/y`
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

#[derive(Error, PartialEq, Debug)]
pub enum TileIdParseError {
    #[error("expected `z/x/y`, got `{0}`")]
    Format(String),
    #[error("invalid tile index: {0}")]
    Index(#[from] ParseIntError),
    #[error("tile `{0}` is outside of the tile grid")]
    OutOfRange(String),
}

impl TileId {
    pub fn new(z: u8, x: u32, y: u32) -> TileId {
        TileId { z, x, y }
    }
    /// Tile covering a WGS84 position
    pub fn containing(lon: f64, lat: f64, zoom: u8) -> TileId {
        let (x, y) = lonlat_to_tile(lon, lat, zoom);
        TileId { z: zoom, x, y }
    }
    /// Zoom level up to `MAX_ZOOM` and column/row within the level
    pub fn is_valid(&self) -> bool {
        self.z <= MAX_ZOOM && self.x < 1 << self.z && self.y < 1 << self.z
    }
    /// Geographic bounding box of the tile
    pub fn bounds(&self) -> Extent {
        tile_bounds(self.x, self.y, self.z)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl FromStr for TileId {
    type Err = TileIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 3 {
            return Err(TileIdParseError::Format(s.to_string()));
        }
        let id = TileId {
            z: parts[0].parse()?,
            x: parts[1].parse()?,
            y: parts[2].parse()?,
        };
        if !id.is_valid() {
            return Err(TileIdParseError::OutOfRange(s.to_string()));
        }
        Ok(id)
    }
}
