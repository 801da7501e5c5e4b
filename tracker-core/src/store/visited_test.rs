//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::tile::TileId;
use crate::store::storage::{MemoryStorage, Storage};
use crate::store::visited::VisitedTiles;

const KEY: &str = "visited_17";

#[test]
fn test_load_missing_state() {
    let storage = MemoryStorage::new();
    let visited = VisitedTiles::new(storage, KEY);
    assert!(visited.is_empty());
}

#[test]
fn test_load_broken_state() {
    let storage = MemoryStorage::new();
    storage.write(KEY, "{not json").unwrap();
    assert!(VisitedTiles::load(&storage, KEY).is_empty());

    storage.write(KEY, r#"{"17/1/2": true}"#).unwrap();
    assert!(VisitedTiles::load(&storage, KEY).is_empty());

    // bad entries are skipped
    storage
        .write(KEY, r#"["17/1/2", "garbage", "17/3/4"]"#)
        .unwrap();
    let tiles = VisitedTiles::load(&storage, KEY);
    assert_eq!(tiles.len(), 2);
    assert!(tiles.contains(&TileId::new(17, 3, 4)));
}

#[test]
fn test_load_out_of_grid_state() {
    let storage = MemoryStorage::new();
    storage
        .write(KEY, r#"["17/4294967295/0", "17/70111/41025", "40/0/0"]"#)
        .unwrap();
    let visited = VisitedTiles::new(storage, KEY);
    assert_eq!(visited.len(), 1);
    let features = visited.export_features();
    assert_eq!(features[0].0, TileId::new(17, 70111, 41025));
    assert!(features[0].1.contains(12.567, 55.675));
}

#[test]
fn test_insert_persists_once() {
    let storage = MemoryStorage::new();
    let mut visited = VisitedTiles::new(storage.clone(), KEY);
    let id = TileId::new(17, 70111, 41025);

    assert!(visited.insert(id));
    assert_eq!(storage.write_count(), 1);
    assert!(visited.has(&id));

    assert!(!visited.insert(id));
    assert_eq!(visited.len(), 1);
    assert_eq!(storage.write_count(), 1);

    assert_eq!(storage.read(KEY), Some(r#"["17/70111/41025"]"#.to_string()));
}

#[test]
fn test_restore() {
    let storage = MemoryStorage::new();
    {
        let mut visited = VisitedTiles::new(storage.clone(), KEY);
        visited.insert(TileId::new(17, 2, 3));
        visited.insert(TileId::new(17, 1, 1));
    }
    let visited = VisitedTiles::new(storage, KEY);
    assert_eq!(
        visited.iter().cloned().collect::<Vec<_>>(),
        vec![TileId::new(17, 1, 1), TileId::new(17, 2, 3)]
    );
}

#[test]
fn test_clear() {
    let storage = MemoryStorage::new();
    let mut visited = VisitedTiles::new(storage.clone(), KEY);
    visited.insert(TileId::new(17, 2, 3));
    visited.clear();
    assert!(visited.is_empty());
    assert_eq!(storage.read(KEY), Some("[]".to_string()));
    assert!(visited.export_features().is_empty());
    assert_eq!(visited.to_geojson()["features"].as_array().unwrap().len(), 0);
}

#[test]
fn test_export() {
    let storage = MemoryStorage::new();
    let mut visited = VisitedTiles::new(storage, KEY);
    let id = TileId::containing(12.568, 55.676, 17);
    visited.insert(id);

    let features = visited.export_features();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].0, id);
    assert_eq!(features[0].1, id.bounds());

    let geojson = visited.to_geojson();
    assert_eq!(geojson["type"], "FeatureCollection");
    let feature = &geojson["features"][0];
    assert_eq!(feature["properties"]["id"], "17/70111/41025");
    assert_eq!(feature["geometry"]["type"], "Polygon");
    let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);
    let b = id.bounds();
    assert_eq!(ring[0][0].as_f64(), Some(b.minx));
    assert_eq!(ring[0][1].as_f64(), Some(b.miny));
    assert_eq!(ring[2][0].as_f64(), Some(b.maxx));
    assert_eq!(ring[2][1].as_f64(), Some(b.maxy));
}
