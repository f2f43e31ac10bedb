//! MapSet Library - Partial Geometry Cache for Map Figures
//!
//! Drawing coastlines or borders over a small region normally means scanning the
//! whole upstream collection for geometries that fall inside the map extent, and
//! doing it again for every figure. This library does that scan once per
//! (source, region) pair, keeps the result as an immutable sequence and can
//! persist it to disk so later runs skip the scan entirely.
//!
//! # Architecture
//!
//! - **[`GeometryRegion`]**: Validated latitude/longitude bounding box, with antimeridian splitting
//! - **[`GeometrySource`]**: Lookup key (category, name, resolution) into an upstream dataset
//! - **[`GeometryProvider`]**: Upstream collections; [`NaturalEarthDirectory`] reads GeoJSON files
//! - **[`CachedFeature`]**: Materialized geometries intersecting a region
//! - **[`MapSet`]**: Bundle of cached layers sharing one region and projection
//!
//! # Example
//!
//! ```ignore
//! let provider = NaturalEarthDirectory::new("data/natural-earth");
//! let region = GeometryRegion::new(15.0, 35.0, 110.0, 135.0)?;
//! let coastline = CachedFeature::build(
//!     &provider,
//!     &GeometrySource::coastline(Resolution::Medium),
//!     region,
//!     &BuildOptions::default(),
//! )?;
//! coastline.save("coastline-15-35-110-135.mapset")?;
//! ```

mod feature;
pub mod geojson;
mod mapset;
mod persist;
mod provider;
mod region;
mod source;

// Public API exports
pub use feature::{AntimeridianPolicy, BuildOptions, CachedFeature};
pub use mapset::{Layer, MapPreset, MapSet, MapSetConfig, Projection};
pub use persist::{FORMAT_VERSION, MAGIC, PayloadKind, peek_kind};
pub use provider::{GeometryProvider, InMemoryProvider, NaturalEarthDirectory};
pub use region::GeometryRegion;
pub use source::{Category, GeometrySource, Resolution};

/// Error types for the mapset library
#[derive(Debug, thiserror::Error)]
pub enum MapSetError {
    #[error("Unknown geometry source: {0}")]
    UnknownSource(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Cache file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("Corrupt cache file {path}: {reason}")]
    CorruptCache {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapSetError>;
