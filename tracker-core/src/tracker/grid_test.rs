//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::tile::TileId;
use crate::tracker::grid::enumerate_grid;
use tile_grid::Extent;

#[test]
fn test_single_tile_viewport() {
    let view = Extent {
        minx: 12.566,
        miny: 55.675,
        maxx: 12.567,
        maxy: 55.676,
    };
    let cells = enumerate_grid(&view, 17, 500);
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].0, TileId::new(17, 70111, 41025));
    assert_eq!(cells[0].1, TileId::new(17, 70111, 41025).bounds());
}

#[test]
fn test_viewport_order() {
    // 3 columns x 2 rows around the Copenhagen tile
    let a = TileId::new(17, 70110, 41025).bounds();
    let b = TileId::new(17, 70112, 41026).bounds();
    let view = Extent {
        minx: a.minx + 0.0001,
        miny: b.miny + 0.0001,
        maxx: b.maxx - 0.0001,
        maxy: a.maxy - 0.0001,
    };
    let ids: Vec<String> = enumerate_grid(&view, 17, 500)
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            "17/70110/41025",
            "17/70110/41026",
            "17/70111/41025",
            "17/70111/41026",
            "17/70112/41025",
            "17/70112/41026",
        ]
    );
}

#[test]
fn test_grid_cap() {
    // a whole city at zoom 17 has far more than 500 tiles
    let view = Extent {
        minx: 12.4,
        miny: 55.6,
        maxx: 12.7,
        maxy: 55.8,
    };
    assert_eq!(enumerate_grid(&view, 17, 500).len(), 500);
    assert_eq!(enumerate_grid(&view, 17, 10).len(), 10);

    // world view
    let world = Extent {
        minx: -180.0,
        miny: -90.0,
        maxx: 180.0,
        maxy: 90.0,
    };
    assert_eq!(enumerate_grid(&world, 17, 500).len(), 500);
}

#[test]
fn test_empty_viewport() {
    let inverted = Extent {
        minx: 12.7,
        miny: 55.6,
        maxx: 12.4,
        maxy: 55.8,
    };
    assert!(enumerate_grid(&inverted, 17, 500).is_empty());
}
