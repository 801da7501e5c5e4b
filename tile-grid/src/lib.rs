//! A library for slippy map tile calculations
//!
//! ## Tile index and bounds
//!
//! ```rust
//! use tile_grid::{lonlat_to_tile, tile_bounds};
//!
//! let (x, y) = lonlat_to_tile(12.568, 55.676, 17);
//! let bounds = tile_bounds(x, y, 17);
//! assert!(bounds.contains(12.568, 55.676));
//! ```
//!
//! ## Grid iterators
//!
//! ```rust
//! use tile_grid::{tile_limits, Extent, GridIterator};
//!
//! let view = Extent {
//!     minx: 12.56,
//!     miny: 55.67,
//!     maxx: 12.57,
//!     maxy: 55.68,
//! };
//! let griditer = GridIterator::new(17, tile_limits(&view, 17));
//! for (z, x, y) in griditer {
//!     println!("Tile {}/{}/{}", z, x, y);
//! }
//! ```

mod grid;
mod grid_iterator;

pub use grid::{level_size, lonlat_to_tile, tile_bounds, tile_limits, Extent, ExtentInt, MAX_LATITUDE};
pub use grid_iterator::GridIterator;
