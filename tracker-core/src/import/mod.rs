//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! KML/KMZ overlay import

pub mod kml;
pub mod kmz;


pub use self::kml::{kml_to_geojson, overlay_bounds};
pub use self::kmz::extract_kml;
use serde_json::Value;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("Invalid archive: {0}")]
    Archive(String),
    #[error("No .kml inside .kmz")]
    NoKmlInArchive,
    #[error("File is not UTF-8 text")]
    Encoding,
    #[error("Invalid XML: {0}")]
    Xml(String),
    #[error("Not a KML document (root element `{0}`)")]
    NotKml(String),
}

/// Read a KML or KMZ file into a GeoJSON FeatureCollection
pub fn read_overlay(file_name: &str, data: &[u8]) -> Result<Value, ImportError> {
    let kml = if file_name.to_lowercase().ends_with(".kmz") {
        extract_kml(data)?
    } else {
        String::from_utf8(data.to_vec()).map_err(|_| ImportError::Encoding)?
    };
    let geojson = kml_to_geojson(&kml)?;
    info!(
        "Imported {} features from '{}'",
        geojson["features"].as_array().map_or(0, |f| f.len()),
        file_name
    );
    Ok(geojson)
}
