//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! KML to GeoJSON conversion

use crate::import::ImportError;
use elementtree::Element;
use serde_json::{Map, Value};
use tile_grid::Extent;

/// Convert a KML document into a GeoJSON FeatureCollection
pub fn kml_to_geojson(kml: &str) -> Result<Value, ImportError> {
    let root =
        Element::from_reader(kml.as_bytes()).map_err(|e| ImportError::Xml(e.to_string()))?;
    if root.tag().name() != "kml" {
        return Err(ImportError::NotKml(root.tag().name().to_string()));
    }
    let mut features = Vec::new();
    collect_placemarks(&root, &mut features);
    Ok(json!({
        "type": "FeatureCollection",
        "features": features
    }))
}

fn collect_placemarks(el: &Element, features: &mut Vec<Value>) {
    for child in el.children() {
        if child.tag().name() == "Placemark" {
            features.push(placemark_feature(child));
        } else {
            collect_placemarks(child, features);
        }
    }
}

fn child<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    el.children().find(|c| c.tag().name() == name)
}

fn child_text(el: &Element, name: &str) -> Option<String> {
    child(el, name)
        .map(|c| c.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn placemark_feature(placemark: &Element) -> Value {
    let mut properties = Map::new();
    for name in &["name", "description", "styleUrl"] {
        if let Some(text) = child_text(placemark, name) {
            properties.insert(name.to_string(), Value::from(text));
        }
    }
    if let Some(data) = child(placemark, "ExtendedData") {
        for item in data.children().filter(|c| c.tag().name() == "Data") {
            if let (Some(key), Some(value)) = (item.get_attr("name"), child_text(item, "value")) {
                properties.insert(key.to_string(), Value::from(value));
            }
        }
    }
    let geometry = placemark
        .children()
        .filter_map(geometry)
        .next()
        .unwrap_or(Value::Null);
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": geometry
    })
}

/// `lon,lat[,alt]` tuples separated by whitespace
fn parse_coordinates(text: &str) -> Vec<Value> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let nums: Vec<f64> = tuple
                .split(',')
                .filter_map(|v| v.trim().parse().ok())
                .collect();
            if nums.len() < 2 {
                None
            } else {
                Some(Value::from(nums))
            }
        })
        .collect()
}

/// gx:coord `lon lat [alt]`
fn parse_gx_coord(text: &str) -> Option<Value> {
    let nums: Vec<f64> = text
        .split_whitespace()
        .filter_map(|v| v.parse().ok())
        .collect();
    if nums.len() < 2 {
        None
    } else {
        Some(Value::from(nums))
    }
}

fn coordinates(el: &Element) -> Vec<Value> {
    child(el, "coordinates")
        .map(|c| parse_coordinates(c.text()))
        .unwrap_or_default()
}

fn ring(el: &Element) -> Option<Value> {
    child(el, "LinearRing")
        .map(coordinates)
        .filter(|coords| !coords.is_empty())
        .map(Value::from)
}

fn geometry(el: &Element) -> Option<Value> {
    match el.tag().name() {
        "Point" => coordinates(el).into_iter().next().map(|coord| {
            json!({
                "type": "Point",
                "coordinates": coord
            })
        }),
        "LineString" => Some(coordinates(el))
            .filter(|coords| !coords.is_empty())
            .map(|coords| {
                json!({
                    "type": "LineString",
                    "coordinates": coords
                })
            }),
        "LinearRing" => Some(coordinates(el))
            .filter(|coords| !coords.is_empty())
            .map(|coords| {
                json!({
                    "type": "Polygon",
                    "coordinates": [coords]
                })
            }),
        "Polygon" => {
            let mut rings = Vec::new();
            if let Some(outer) = child(el, "outerBoundaryIs").and_then(ring) {
                rings.push(outer);
            }
            for inner in el
                .children()
                .filter(|c| c.tag().name() == "innerBoundaryIs")
            {
                if let Some(inner) = ring(inner) {
                    rings.push(inner);
                }
            }
            if rings.is_empty() {
                None
            } else {
                Some(json!({
                    "type": "Polygon",
                    "coordinates": rings
                }))
            }
        }
        "MultiGeometry" => {
            let geometries: Vec<Value> = el.children().filter_map(geometry).collect();
            Some(json!({
                "type": "GeometryCollection",
                "geometries": geometries
            }))
        }
        "Track" => {
            let coords: Vec<Value> = el
                .children()
                .filter(|c| c.tag().name() == "coord")
                .filter_map(|c| parse_gx_coord(c.text()))
                .collect();
            if coords.is_empty() {
                None
            } else {
                Some(json!({
                    "type": "LineString",
                    "coordinates": coords
                }))
            }
        }
        _ => None,
    }
}

fn expand_positions(coords: &Value, extent: &mut Option<Extent>) {
    let arr = match coords.as_array() {
        Some(arr) => arr,
        None => return,
    };
    match (
        arr.get(0).and_then(Value::as_f64),
        arr.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => match extent {
            Some(ext) => ext.expand(lon, lat),
            None => {
                *extent = Some(Extent {
                    minx: lon,
                    miny: lat,
                    maxx: lon,
                    maxy: lat,
                })
            }
        },
        _ => {
            for item in arr {
                expand_positions(item, extent);
            }
        }
    }
}

fn expand_geometry(geometry: &Value, extent: &mut Option<Extent>) {
    if let Some(geometries) = geometry["geometries"].as_array() {
        for g in geometries {
            expand_geometry(g, extent);
        }
    }
    expand_positions(&geometry["coordinates"], extent);
}

/// Extent of all coordinates of a GeoJSON FeatureCollection
pub fn overlay_bounds(geojson: &Value) -> Option<Extent> {
    let mut extent = None;
    for feature in geojson["features"].as_array().into_iter().flatten() {
        expand_geometry(&feature["geometry"], &mut extent);
    }
    extent
}
