//! GeoJSON-like feature types and centroid helpers.
//!
//! # Responsibility
//! - Model the subset of GeoJSON the map layer renders: polygon and
//!   multi-polygon features inside a feature collection.
//! - Compute the average-center view point for a collection.
//!
//! # Invariants
//! - Coordinates are `[longitude, latitude]` pairs, GeoJSON order.
//! - Serialization round-trips through the external `comuni_dict.json`
//!   dictionary shape unchanged.

use serde::{Deserialize, Serialize};

/// Fallback view center when a collection carries no coordinates
/// (geographic center of Italy).
pub const ITALY_CENTER: (f64, f64) = (41.9, 12.5);

/// Polygonal geometry in GeoJSON coordinate layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        /// Rings of `[lon, lat]` points; first ring is the outer boundary.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

/// Feature metadata carried alongside the geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Canonical municipality code.
    pub id: String,
    /// Display name, from the directory or a generated label.
    pub name: String,
    /// `true` when the geometry was synthesized rather than sourced from
    /// an authoritative boundary provider.
    #[serde(default)]
    pub synthetic: bool,
}

/// One renderable municipality boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(properties: FeatureProperties, geometry: Geometry) -> Self {
        Self {
            kind: feature_type(),
            properties,
            geometry,
        }
    }
}

/// Renderable set of features, preserving resolver output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

/// Average `(lat, lon)` over every coordinate in the collection.
///
/// Falls back to [`ITALY_CENTER`] when the collection holds no points.
pub fn center_of(collection: &FeatureCollection) -> (f64, f64) {
    let mut sum_lon = 0.0;
    let mut sum_lat = 0.0;
    let mut count = 0usize;

    let mut accumulate = |point: &[f64; 2]| {
        sum_lon += point[0];
        sum_lat += point[1];
        count += 1;
    };

    for feature in &collection.features {
        match &feature.geometry {
            Geometry::Polygon { coordinates } => {
                for ring in coordinates {
                    ring.iter().for_each(&mut accumulate);
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        ring.iter().for_each(&mut accumulate);
                    }
                }
            }
        }
    }

    if count == 0 {
        return ITALY_CENTER;
    }

    (sum_lat / count as f64, sum_lon / count as f64)
}

#[cfg(test)]
mod tests {
    use super::{center_of, Feature, FeatureCollection, FeatureProperties, Geometry, ITALY_CENTER};

    fn square_feature(id: &str, origin: f64) -> Feature {
        Feature::new(
            FeatureProperties {
                id: id.to_string(),
                name: format!("Municipality {id}"),
                synthetic: true,
            },
            Geometry::Polygon {
                coordinates: vec![vec![
                    [origin, origin],
                    [origin + 0.1, origin],
                    [origin + 0.1, origin + 0.1],
                    [origin, origin + 0.1],
                    [origin, origin],
                ]],
            },
        )
    }

    #[test]
    fn empty_collection_centers_on_italy() {
        let collection = FeatureCollection::new(Vec::new());
        assert_eq!(center_of(&collection), ITALY_CENTER);
    }

    #[test]
    fn center_averages_all_points() {
        let collection = FeatureCollection::new(vec![square_feature("097042", 9.0)]);
        let (lat, lon) = center_of(&collection);
        assert!((lat - 9.04).abs() < 1e-9);
        assert!((lon - 9.04).abs() < 1e-9);
    }

    #[test]
    fn feature_serializes_with_geojson_type_tags() {
        let json = serde_json::to_value(square_feature("097042", 9.0)).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["properties"]["id"], "097042");
    }
}
