//! Upstream geometry providers
//!
//! A provider hands out the full, ordered collection for a [`GeometrySource`]. The
//! collection is shared as `Arc<[Geometry]>` so builders can only read it.

use crate::{GeometrySource, MapSetError, Result, geojson};
use dashmap::DashMap;
use geo::Geometry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of full geometry collections
///
/// Implementations must be safe for concurrent reads: map sets build their layers
/// in parallel against one provider.
pub trait GeometryProvider: Send + Sync {
    /// Full collection for `source`, in upstream order
    ///
    /// # Errors
    /// `UnknownSource` if the provider has no collection for `source`.
    fn collection(&self, source: &GeometrySource) -> Result<Arc<[Geometry<f64>]>>;
}

/// Provider backed by collections already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    collections: HashMap<GeometrySource, Arc<[Geometry<f64>]>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the collection for `source`
    pub fn insert(&mut self, source: GeometrySource, geometries: Vec<Geometry<f64>>) {
        self.collections.insert(source, geometries.into());
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_collection(mut self, source: GeometrySource, geometries: Vec<Geometry<f64>>) -> Self {
        self.insert(source, geometries);
        self
    }

    pub fn sources(&self) -> impl Iterator<Item = &GeometrySource> {
        self.collections.keys()
    }
}

impl GeometryProvider for InMemoryProvider {
    fn collection(&self, source: &GeometrySource) -> Result<Arc<[Geometry<f64>]>> {
        self.collections
            .get(source)
            .cloned()
            .ok_or_else(|| MapSetError::UnknownSource(source.to_string()))
    }
}

/// Provider reading Natural Earth layers exported as GeoJSON
///
/// A source resolves to the first existing file among:
/// 1. an explicit override registered with [`with_file`](Self::with_file)
/// 2. `<root>/<file_stem>.geojson`
/// 3. `<root>/<category>/<file_stem>.geojson`
///
/// Parsed collections are memoised for the lifetime of the provider.
#[derive(Debug)]
pub struct NaturalEarthDirectory {
    root: PathBuf,
    overrides: HashMap<GeometrySource, PathBuf>,
    loaded: DashMap<GeometrySource, Arc<[Geometry<f64>]>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl NaturalEarthDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overrides: HashMap::new(),
            loaded: DashMap::new(),
        }
    }

    /// Serve `source` from a specific GeoJSON file (e.g. provinces or counties)
    pub fn with_file(mut self, source: GeometrySource, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(source, path.into());
        self
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the collection for `source` would be read from, if any exists
    pub fn resolve(&self, source: &GeometrySource) -> Option<PathBuf> {
        if let Some(path) = self.overrides.get(source) {
            return path.is_file().then(|| path.clone());
        }

        let file_name = format!("{}.geojson", source.file_stem());
        [
            self.root.join(&file_name),
            self.root.join(source.category.as_str()).join(&file_name),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Number of collections parsed so far
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl GeometryProvider for NaturalEarthDirectory {
    fn collection(&self, source: &GeometrySource) -> Result<Arc<[Geometry<f64>]>> {
        if let Some(collection) = self.loaded.get(source) {
            return Ok(collection.value().clone());
        }

        let path = self
            .resolve(source)
            .ok_or_else(|| MapSetError::UnknownSource(source.to_string()))?;

        // No map guard is held while parsing
        let geometries: Arc<[Geometry<f64>]> = geojson::read_geometries(&path)?.into();
        tracing::info!(
            "Loaded {} geometries for {} from {}",
            geometries.len(),
            source,
            path.display()
        );

        let collection = self
            .loaded
            .entry(source.clone())
            .or_insert(geometries)
            .value()
            .clone();
        Ok(collection)
    }
}

impl<P: GeometryProvider + ?Sized> GeometryProvider for Arc<P> {
    fn collection(&self, source: &GeometrySource) -> Result<Arc<[Geometry<f64>]>> {
        (**self).collection(source)
    }
}
