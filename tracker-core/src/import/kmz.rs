//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::import::ImportError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Text of the first `.kml` entry of a KMZ archive
pub fn extract_kml(data: &[u8]) -> Result<String, ImportError> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| ImportError::Archive(e.to_string()))?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ImportError::Archive(e.to_string()))?;
        if !entry.name().to_lowercase().ends_with(".kml") {
            continue;
        }
        debug!("Found KML in KMZ: {}", entry.name());
        let mut kml = String::new();
        entry.read_to_string(&mut kml)?;
        return Ok(kml);
    }
    Err(ImportError::NoKmlInArchive)
}
