//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::tile::{TileId, TileIdParseError};

#[test]
fn test_tile_id_string() {
    let id = TileId::new(17, 70111, 41025);
    assert_eq!(id.to_string(), "17/70111/41025");
    assert_eq!("17/70111/41025".parse::<TileId>(), Ok(id));

    for &(z, x, y) in &[(0, 0, 0), (1, 1, 0), (17, 131071, 131071), (30, 1 << 29, 42)] {
        let id = TileId::new(z, x, y);
        assert_eq!(id.to_string().parse::<TileId>(), Ok(id));
    }
}

#[test]
fn test_tile_id_parse_errors() {
    assert_eq!(
        "17/1".parse::<TileId>(),
        Err(TileIdParseError::Format("17/1".to_string()))
    );
    assert!("17/1/2/3".parse::<TileId>().is_err());
    assert!("17/-1/2".parse::<TileId>().is_err());
    assert!("z/x/y".parse::<TileId>().is_err());
    assert!("".parse::<TileId>().is_err());
}

#[test]
fn test_tile_id_range() {
    assert_eq!(
        "17/4294967295/0".parse::<TileId>(),
        Err(TileIdParseError::OutOfRange("17/4294967295/0".to_string()))
    );
    assert!("17/131072/0".parse::<TileId>().is_err());
    assert!("17/0/131072".parse::<TileId>().is_err());
    assert!("31/0/0".parse::<TileId>().is_err());
    assert!("0/0/0".parse::<TileId>().is_ok());
    assert!(TileId::new(17, 131071, 131071).is_valid());
    assert!(!TileId::new(2, 4, 0).is_valid());
}

#[test]
fn test_containing_tile() {
    let id = TileId::containing(12.568, 55.676, 17);
    assert_eq!(id, TileId::new(17, 70111, 41025));
    assert!(id.bounds().contains(12.568, 55.676));
}

#[test]
fn test_tile_ordering() {
    let mut ids = vec![
        TileId::new(17, 2, 1),
        TileId::new(17, 1, 5),
        TileId::new(16, 9, 9),
    ];
    ids.sort();
    assert_eq!(
        ids,
        vec![
            TileId::new(16, 9, 9),
            TileId::new(17, 1, 5),
            TileId::new(17, 2, 1)
        ]
    );
}
