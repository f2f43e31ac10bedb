//! GeoJSON ingestion into `geo` geometries
//!
//! Documents may be a feature collection, a single feature or a bare geometry.
//! Properties are ignored.

use crate::{MapSetError, Result};
use ::geojson::{GeoJson, Position, Value};
use geo::Geometry;
use std::path::Path;

fn invalid(reason: impl std::fmt::Display) -> MapSetError {
    MapSetError::InvalidGeometry(reason.to_string())
}

/// Parse a GeoJSON document into its geometries, in document order
///
/// A `FeatureCollection` yields one geometry per feature, a `Feature` yields its
/// geometry, and a bare geometry yields itself. Features with a `null` geometry
/// are skipped.
pub fn parse_geometries(text: &str) -> Result<Vec<Geometry<f64>>> {
    let document: GeoJson = text
        .parse()
        .map_err(|e| invalid(format!("malformed GeoJSON: {e}")))?;

    let objects: Vec<::geojson::Geometry> = match document {
        GeoJson::FeatureCollection(collection) => {
            let total = collection.features.len();
            let objects: Vec<_> = collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .collect();
            if objects.len() < total {
                tracing::warn!("Skipped {} features without geometry", total - objects.len());
            }
            objects
        }
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    objects
        .into_iter()
        .map(|object| {
            check_positions(&object.value)?;
            Geometry::try_from(object.value)
                .map_err(|e| invalid(format!("unsupported GeoJSON geometry: {e}")))
        })
        .collect()
}

/// Read and parse a GeoJSON file
pub fn read_geometries(path: &Path) -> Result<Vec<Geometry<f64>>> {
    let text = std::fs::read_to_string(path)?;
    parse_geometries(&text).map_err(|e| match e {
        MapSetError::InvalidGeometry(reason) => {
            MapSetError::InvalidGeometry(format!("{}: {reason}", path.display()))
        }
        other => other,
    })
}

fn is_short(position: &Position) -> bool {
    position.len() < 2
}

/// Every position needs a longitude and a latitude; extra ordinates are dropped
fn check_positions(value: &Value) -> Result<()> {
    let short = match value {
        Value::Point(position) => is_short(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().any(is_short)
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().any(is_short)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().any(is_short),
        Value::GeometryCollection(geometries) => {
            return geometries
                .iter()
                .try_for_each(|geometry| check_positions(&geometry.value));
        }
    };
    if short {
        return Err(invalid("position needs at least 2 ordinates"));
    }
    Ok(())
}
