//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Visible tile grid

use crate::core::tile::TileId;
use tile_grid::{tile_limits, Extent, GridIterator};

/// Tiles of one zoom level intersecting a viewport, at most `max_tiles`
pub fn enumerate_grid(viewport: &Extent, zoom: u8, max_tiles: usize) -> Vec<(TileId, Extent)> {
    let limits = tile_limits(viewport, zoom);
    if limits.count() > max_tiles as u64 {
        debug!(
            "Grid of {} tiles truncated to {}",
            limits.count(),
            max_tiles
        );
    }
    GridIterator::new(zoom, limits)
        .take(max_tiles)
        .map(|(z, x, y)| {
            let id = TileId::new(z, x, y);
            (id, id.bounds())
        })
        .collect()
}
