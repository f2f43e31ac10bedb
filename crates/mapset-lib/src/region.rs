//! Geographic bounding boxes used as intersection filters
//!
//! A [`GeometryRegion`] is always valid: the only way to obtain one is through a
//! validating constructor (or deserialization, which runs the same checks).

use crate::{MapSetError, Result};
use geo::{Coord, Geometry, Intersects, Rect};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Longitude of the antimeridian in degrees
pub const ANTIMERIDIAN: f64 = 180.0;

/// Rectangular latitude/longitude extent in degrees
///
/// Longitudes above 180 are allowed so that regions east of the antimeridian can be
/// written continuously (e.g. `lon_min = 170, lon_max = 200`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct GeometryRegion {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl GeometryRegion {
    /// Create a new region
    ///
    /// # Errors
    /// `InvalidRegion` if a bound is not finite, `lat_min >= lat_max` or
    /// `lon_min >= lon_max`.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self> {
        if ![lat_min, lat_max, lon_min, lon_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(MapSetError::InvalidRegion(format!(
                "non-finite bound in ({lat_min}, {lat_max}, {lon_min}, {lon_max})"
            )));
        }
        if lat_min >= lat_max {
            return Err(MapSetError::InvalidRegion(format!(
                "lat_min ({lat_min}) must be below lat_max ({lat_max})"
            )));
        }
        if lon_min >= lon_max {
            return Err(MapSetError::InvalidRegion(format!(
                "lon_min ({lon_min}) must be below lon_max ({lon_max})"
            )));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Create a region from a `(lat_min, lat_max, lon_min, lon_max)` georange tuple
    pub fn from_georange(georange: (f64, f64, f64, f64)) -> Result<Self> {
        let (lat_min, lat_max, lon_min, lon_max) = georange;
        Self::new(lat_min, lat_max, lon_min, lon_max)
    }

    #[inline]
    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    #[inline]
    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    #[inline]
    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    #[inline]
    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Georange order: `(lat_min, lat_max, lon_min, lon_max)`
    #[inline]
    pub fn georange(&self) -> (f64, f64, f64, f64) {
        (self.lat_min, self.lat_max, self.lon_min, self.lon_max)
    }

    /// Cartographic extent order: `(lon_min, lon_max, lat_min, lat_max)`
    #[inline]
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (self.lon_min, self.lon_max, self.lat_min, self.lat_max)
    }

    /// Whether the longitude span crosses +180/-180
    #[inline]
    pub fn straddles_antimeridian(&self) -> bool {
        self.lon_min < ANTIMERIDIAN && ANTIMERIDIAN < self.lon_max
    }

    /// Midpoint of the longitude span, used as default projection centre
    #[inline]
    pub fn central_longitude(&self) -> f64 {
        (self.lon_min + self.lon_max) / 2.0
    }

    /// The region as a single rectangle (x = longitude, y = latitude)
    pub fn to_rect(&self) -> Rect<f64> {
        Self::rect(self.lon_min, self.lon_max, self.lat_min, self.lat_max)
    }

    /// Rectangles the intersection pass runs against
    ///
    /// Ordinary regions yield one rectangle. Straddling regions yield
    /// `[lon_min, 180]` followed by `[-180, lon_max - 360]`, both with the region's
    /// latitude bounds.
    pub fn sub_extents(&self) -> SmallVec<[Rect<f64>; 2]> {
        if self.straddles_antimeridian() {
            smallvec![
                Self::rect(self.lon_min, ANTIMERIDIAN, self.lat_min, self.lat_max),
                Self::rect(
                    -ANTIMERIDIAN,
                    self.lon_max - 360.0,
                    self.lat_min,
                    self.lat_max
                ),
            ]
        } else {
            smallvec![self.to_rect()]
        }
    }

    /// Whether `geometry` intersects any of the region's sub-extents
    pub fn intersects(&self, geometry: &Geometry<f64>) -> bool {
        self.sub_extents()
            .iter()
            .any(|rect| geometry.intersects(rect))
    }

    #[inline]
    fn rect(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Rect<f64> {
        Rect::new(
            Coord {
                x: lon_min,
                y: lat_min,
            },
            Coord {
                x: lon_max,
                y: lat_max,
            },
        )
    }
}

impl std::fmt::Display for GeometryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat [{}, {}] lon [{}, {}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

impl TryFrom<[f64; 4]> for GeometryRegion {
    type Error = MapSetError;

    fn try_from(value: [f64; 4]) -> Result<Self> {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<GeometryRegion> for [f64; 4] {
    fn from(region: GeometryRegion) -> Self {
        [region.lat_min, region.lat_max, region.lon_min, region.lon_max]
    }
}

impl std::str::FromStr for GeometryRegion {
    type Err = MapSetError;

    /// Parse `LATMIN,LATMAX,LONMIN,LONMAX`
    fn from_str(s: &str) -> Result<Self> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|e| {
                    MapSetError::InvalidRegion(format!("cannot parse '{}': {e}", part.trim()))
                })
            })
            .collect::<Result<_>>()?;
        match values.as_slice() {
            [lat_min, lat_max, lon_min, lon_max] => {
                Self::new(*lat_min, *lat_max, *lon_min, *lon_max)
            }
            _ => Err(MapSetError::InvalidRegion(format!(
                "expected 4 comma separated values, got {}",
                values.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point};

    #[test]
    fn test_valid_region() {
        let region = GeometryRegion::new(15.0, 35.0, 110.0, 135.0).unwrap();
        assert_eq!(region.georange(), (15.0, 35.0, 110.0, 135.0));
        assert_eq!(region.extent(), (110.0, 135.0, 15.0, 35.0));
        assert!(!region.straddles_antimeridian());
        assert_eq!(region.central_longitude(), 122.5);
    }

    #[test]
    fn test_inverted_latitude_fails() {
        let result = GeometryRegion::new(10.0, 5.0, 0.0, 10.0);
        assert!(matches!(result, Err(MapSetError::InvalidRegion(_))));
    }

    #[test]
    fn test_degenerate_longitude_fails() {
        let result = GeometryRegion::new(0.0, 10.0, 20.0, 20.0);
        assert!(matches!(result, Err(MapSetError::InvalidRegion(_))));
    }

    #[test]
    fn test_nan_fails() {
        let result = GeometryRegion::new(f64::NAN, 10.0, 0.0, 10.0);
        assert!(matches!(result, Err(MapSetError::InvalidRegion(_))));
    }

    #[test]
    fn test_single_sub_extent() {
        let region = GeometryRegion::new(0.0, 30.0, 100.0, 180.0).unwrap();
        // Touching 180 is not straddling
        assert!(!region.straddles_antimeridian());
        assert_eq!(region.sub_extents().len(), 1);
    }

    #[test]
    fn test_antimeridian_split() {
        let region = GeometryRegion::new(0.0, 30.0, 170.0, 200.0).unwrap();
        assert!(region.straddles_antimeridian());

        let extents = region.sub_extents();
        assert_eq!(extents.len(), 2);
        assert_eq!(extents[0].min(), Coord { x: 170.0, y: 0.0 });
        assert_eq!(extents[0].max(), Coord { x: 180.0, y: 30.0 });
        assert_eq!(extents[1].min(), Coord { x: -180.0, y: 0.0 });
        assert_eq!(extents[1].max(), Coord { x: -160.0, y: 30.0 });
    }

    #[test]
    fn test_intersects_across_antimeridian() {
        let region = GeometryRegion::new(0.0, 30.0, 170.0, 200.0).unwrap();
        let west_of_line = Geometry::Point(Point::new(175.0, 10.0));
        let east_of_line = Geometry::Point(Point::new(-170.0, 10.0));
        let far_away = Geometry::Point(Point::new(0.0, 10.0));

        assert!(region.intersects(&west_of_line));
        assert!(region.intersects(&east_of_line));
        assert!(!region.intersects(&far_away));
    }

    #[test]
    fn test_line_crossing_region_without_vertices_inside() {
        let region = GeometryRegion::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let line = Geometry::LineString(LineString::from(vec![(-5.0, 5.0), (15.0, 5.0)]));
        assert!(region.intersects(&line));
    }

    #[test]
    fn test_parse_from_str() {
        let region: GeometryRegion = "15, 35, 110, 135".parse().unwrap();
        assert_eq!(region.georange(), (15.0, 35.0, 110.0, 135.0));

        assert!("15,35,110".parse::<GeometryRegion>().is_err());
        assert!("a,b,c,d".parse::<GeometryRegion>().is_err());
        assert!("35,15,110,135".parse::<GeometryRegion>().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: GeometryRegion = serde_json::from_str("[15.0, 35.0, 110.0, 135.0]").unwrap();
        assert_eq!(ok.lon_max(), 135.0);

        let bad = serde_json::from_str::<GeometryRegion>("[35.0, 15.0, 110.0, 135.0]");
        assert!(bad.is_err());
    }
}
