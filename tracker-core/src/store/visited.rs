//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Persisted set of visited tiles

use crate::core::tile::TileId;
use crate::store::storage::Storage;
use serde_json::Value;
use std::collections::btree_set;
use std::collections::BTreeSet;
use tile_grid::Extent;

pub struct VisitedTiles<S: Storage> {
    storage: S,
    key: String,
    tiles: BTreeSet<TileId>,
}

impl<S: Storage> VisitedTiles<S> {
    /// Restore visited tiles from storage
    pub fn new(storage: S, key: &str) -> VisitedTiles<S> {
        let tiles = Self::load(&storage, key);
        info!("{} visited tiles restored ({})", tiles.len(), storage.info());
        VisitedTiles {
            storage,
            key: key.to_string(),
            tiles,
        }
    }

    /// Read persisted identifiers. Missing or broken state yields an empty set.
    pub fn load(storage: &S, key: &str) -> BTreeSet<TileId> {
        let json = match storage.read(key) {
            Some(json) => json,
            None => return BTreeSet::new(),
        };
        let ids: Vec<String> = match serde_json::from_str(&json) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Ignoring unreadable visited tile list `{}`: {}", key, e);
                return BTreeSet::new();
            }
        };
        ids.iter()
            .filter_map(|id| match id.parse::<TileId>() {
                Ok(tile) => Some(tile),
                Err(e) => {
                    warn!("Skipping visited tile `{}`: {}", id, e);
                    None
                }
            })
            .collect()
    }

    pub fn has(&self, id: &TileId) -> bool {
        self.tiles.contains(id)
    }

    /// Add tile. Returns true and persists the set if the tile was not visited before.
    pub fn insert(&mut self, id: TileId) -> bool {
        if !self.tiles.insert(id) {
            return false;
        }
        debug!("New visited tile {}", id);
        self.persist();
        true
    }

    /// Remove all tiles and persist the empty set
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, TileId> {
        self.tiles.iter()
    }

    /// Tile polygons of all visited tiles
    pub fn export_features(&self) -> Vec<(TileId, Extent)> {
        self.tiles.iter().map(|id| (*id, id.bounds())).collect()
    }

    /// GeoJSON FeatureCollection with one polygon per visited tile
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .export_features()
            .iter()
            .map(|(id, bounds)| tile_feature(id, bounds))
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": features
        })
    }

    fn persist(&self) {
        let ids: Vec<String> = self.tiles.iter().map(|id| id.to_string()).collect();
        let json = Value::from(ids).to_string();
        if let Err(e) = self.storage.write(&self.key, &json) {
            warn!("Could not persist visited tiles: {}", e);
        }
    }
}

/// GeoJSON polygon feature of a tile
pub fn tile_feature(id: &TileId, b: &Extent) -> Value {
    json!({
        "type": "Feature",
        "properties": { "id": id.to_string() },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [b.minx, b.miny],
                [b.minx, b.maxy],
                [b.maxx, b.maxy],
                [b.maxx, b.miny],
                [b.minx, b.miny]
            ]]
        }
    })
}
