//! CachedFeature - geometries of one source that intersect one region
//!
//! The intersection scan runs once at build time; afterwards the feature is an
//! immutable sequence that can be queried, persisted and reloaded.

use crate::{GeometryProvider, GeometryRegion, GeometrySource, Result, persist};
use geo::{BoundingRect, Coord, Geometry, Intersects, Rect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the two passes of an antimeridian-straddling region are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntimeridianPolicy {
    /// Concatenate both passes as-is. A geometry touching both halves of the
    /// region appears twice.
    #[default]
    Concatenate,
    /// Keep only the first occurrence of each upstream geometry.
    Deduplicate,
}

/// Options for [`CachedFeature::build`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub antimeridian: AntimeridianPolicy,
}

/// Materialized subset of a source's geometries intersecting a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFeature {
    source: GeometrySource,
    region: GeometryRegion,
    geometries: Vec<Geometry<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl CachedFeature {
    /// Load the collection for `source` from `provider` and keep the geometries
    /// intersecting `region`
    ///
    /// # Errors
    /// `UnknownSource` if the provider has no such collection, or whatever error the
    /// provider reports while loading it.
    pub fn build<P: GeometryProvider + ?Sized>(
        provider: &P,
        source: &GeometrySource,
        region: GeometryRegion,
        options: &BuildOptions,
    ) -> Result<Self> {
        let collection = provider.collection(source)?;
        Ok(Self::build_from_collection(
            source.clone(),
            region,
            &collection,
            options,
        ))
    }

    /// Same as [`build`](Self::build) for a collection that is already loaded
    pub fn build_from_collection(
        source: GeometrySource,
        region: GeometryRegion,
        collection: &[Geometry<f64>],
        options: &BuildOptions,
    ) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("feature::build_from_collection");

        let mut indices: Vec<usize> = region
            .sub_extents()
            .iter()
            .flat_map(|rect| Self::intersecting_indices(collection, rect))
            .collect();

        if options.antimeridian == AntimeridianPolicy::Deduplicate {
            let mut seen = vec![false; collection.len()];
            indices.retain(|&i| !std::mem::replace(&mut seen[i], true));
        }

        let geometries: Vec<Geometry<f64>> =
            indices.iter().map(|&i| collection[i].clone()).collect();

        tracing::debug!(
            source = %source,
            region = %region,
            scanned = collection.len(),
            matched = geometries.len(),
            "Built cached feature"
        );

        Self {
            source,
            region,
            geometries,
        }
    }

    /// Indices of the geometries intersecting `rect`, in collection order
    fn intersecting_indices(collection: &[Geometry<f64>], rect: &Rect<f64>) -> Vec<usize> {
        collection
            .par_iter()
            .enumerate()
            .filter(|(_, geometry)| geometry.intersects(rect))
            .map(|(index, _)| index)
            .collect()
    }

    /// Stored geometries, ready for a rendering call
    #[inline]
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Geometry<f64>> {
        self.geometries.iter()
    }

    #[inline]
    pub fn source(&self) -> &GeometrySource {
        &self.source
    }

    #[inline]
    pub fn region(&self) -> GeometryRegion {
        self.region
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Union of the stored geometries' extents, `None` when empty
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometries
            .iter()
            .filter_map(|geometry| geometry.bounding_rect())
            .reduce(|acc, rect| {
                Rect::new(
                    Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                )
            })
    }

    /// Persist the feature atomically at `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::write(path.as_ref(), persist::PayloadKind::Feature, self)
    }

    /// Load a feature written by [`save`](Self::save)
    ///
    /// # Errors
    /// `NotFound` if `path` does not exist, `CorruptCache` if it is not a feature
    /// cache file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        persist::read(path.as_ref(), persist::PayloadKind::Feature)
    }
}

impl<'a> IntoIterator for &'a CachedFeature {
    type Item = &'a Geometry<f64>;
    type IntoIter = std::slice::Iter<'a, Geometry<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
