//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Grid iterators

use crate::grid::ExtentInt;

/// Column-by-column iterator over the cells of one zoom level
pub struct GridIterator {
    z: u8,
    x: u32,
    y: u32,
    limit: ExtentInt,
    finished: bool,
}

impl GridIterator {
    pub fn new(zoom: u8, limit: ExtentInt) -> GridIterator {
        let finished = limit.minx >= limit.maxx || limit.miny >= limit.maxy;
        GridIterator {
            z: zoom,
            x: limit.minx,
            y: limit.miny,
            limit,
            finished,
        }
    }
}

impl Iterator for GridIterator {
    /// Current cell index `(z, x, y)`
    type Item = (u8, u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let current = (self.z, self.x, self.y);
        if self.y < self.limit.maxy - 1 {
            self.y += 1;
        } else if self.x < self.limit.maxx - 1 {
            self.x += 1;
            self.y = self.limit.miny;
        } else {
            self.finished = true;
        }
        Some(current)
    }
}

#[test]
fn test_level_iter() {
    use crate::grid::{tile_limits, Extent};
    let world = Extent {
        minx: -180.0,
        miny: -85.0,
        maxx: 180.0,
        maxy: 85.0,
    };
    let griditer = GridIterator::new(1, tile_limits(&world, 1));
    let cells = griditer.collect::<Vec<_>>();
    assert_eq!(cells, vec![(1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]);

    let griditer = GridIterator::new(0, tile_limits(&world, 0));
    let cells = griditer.collect::<Vec<_>>();
    assert_eq!(cells, vec![(0, 0, 0)]);
}

#[test]
fn test_bad_params() {
    // empty limits
    let griditer = GridIterator::new(
        10,
        ExtentInt {
            minx: 0,
            miny: 0,
            maxx: 0,
            maxy: 0,
        },
    );
    let cells = griditer.collect::<Vec<_>>();
    assert_eq!(cells, vec![]);

    // min > max
    let griditer = GridIterator::new(
        10,
        ExtentInt {
            minx: 5,
            miny: 5,
            maxx: 4,
            maxy: 6,
        },
    );
    let cells = griditer.collect::<Vec<_>>();
    assert_eq!(cells, vec![]);

    // single column
    let griditer = GridIterator::new(
        2,
        ExtentInt {
            minx: 3,
            miny: 1,
            maxx: 4,
            maxy: 3,
        },
    );
    let cells = griditer.collect::<Vec<_>>();
    assert_eq!(cells, vec![(2, 3, 1), (2, 3, 2)]);
}
