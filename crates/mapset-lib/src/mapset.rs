//! MapSet - reusable bundle of cached layers for one map region
//!
//! Plotting many figures over the same small region repeats the same geometry
//! scans for every figure. A map set runs them once, for every layer the figures
//! need, and can be saved next to the figure scripts and reloaded by each run.

use crate::{
    BuildOptions, CachedFeature, GeometryProvider, GeometryRegion, GeometrySource, MapSetError,
    Resolution, Result, persist,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Map layers a map set can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Coastline,
    Country,
    Land,
    Ocean,
    Province,
    City,
    County,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Coastline,
        Layer::Country,
        Layer::Land,
        Layer::Ocean,
        Layer::Province,
        Layer::City,
        Layer::County,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Coastline => "coastline",
            Layer::Country => "country",
            Layer::Land => "land",
            Layer::Ocean => "ocean",
            Layer::Province => "province",
            Layer::City => "city",
            Layer::County => "county",
        }
    }

    /// Natural Earth source for the layer, `None` for administrative layers that
    /// come from custom datasets
    pub fn natural_earth_source(&self, resolution: Resolution) -> Option<GeometrySource> {
        match self {
            Layer::Coastline => Some(GeometrySource::coastline(resolution)),
            Layer::Country => Some(GeometrySource::country_borders(resolution)),
            Layer::Land => Some(GeometrySource::land(resolution)),
            Layer::Ocean => Some(GeometrySource::ocean(resolution)),
            Layer::Province | Layer::City | Layer::County => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = MapSetError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == lower)
            .ok_or_else(|| MapSetError::InvalidArgument(format!("unknown layer '{s}'")))
    }
}

/// Map projection a map set is meant to be drawn with
///
/// Only the name travels with the map set; projecting is the renderer's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    PlateCarree,
    LambertConformal,
    Miller,
    Mercator,
    NorthPolarStereo,
    SouthPolarStereo,
    Geostationary,
}

impl Projection {
    pub const ALL: [Projection; 7] = [
        Projection::PlateCarree,
        Projection::LambertConformal,
        Projection::Miller,
        Projection::Mercator,
        Projection::NorthPolarStereo,
        Projection::SouthPolarStereo,
        Projection::Geostationary,
    ];

    pub fn short_code(&self) -> &'static str {
        match self {
            Projection::PlateCarree => "P",
            Projection::LambertConformal => "L",
            Projection::Miller => "ML",
            Projection::Mercator => "M",
            Projection::NorthPolarStereo => "N",
            Projection::SouthPolarStereo => "S",
            Projection::Geostationary => "G",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Projection::PlateCarree => "PlateCarree",
            Projection::LambertConformal => "LambertConformal",
            Projection::Miller => "Miller",
            Projection::Mercator => "Mercator",
            Projection::NorthPolarStereo => "NorthPolarStereo",
            Projection::SouthPolarStereo => "SouthPolarStereo",
            Projection::Geostationary => "Geostationary",
        }
    }

    /// Basemap-style alias (`cyl`, `merc`, `lcc`, `geos`, `npaeqd`, `spaeqd`)
    fn from_basemap_alias(alias: &str) -> Option<Self> {
        match alias {
            "cyl" => Some(Projection::PlateCarree),
            "merc" => Some(Projection::Mercator),
            "lcc" => Some(Projection::LambertConformal),
            "geos" => Some(Projection::Geostationary),
            "npaeqd" => Some(Projection::NorthPolarStereo),
            "spaeqd" => Some(Projection::SouthPolarStereo),
            _ => None,
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = MapSetError;

    /// Accepts short codes (`P`, `ML`, ...), full names and basemap aliases
    fn from_str(s: &str) -> Result<Self> {
        Projection::ALL
            .into_iter()
            .find(|p| p.short_code().eq_ignore_ascii_case(s) || p.name().eq_ignore_ascii_case(s))
            .or_else(|| Projection::from_basemap_alias(&s.to_ascii_lowercase()))
            .ok_or_else(|| MapSetError::InvalidArgument(format!("unknown projection '{s}'")))
    }
}

/// Built-in map regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPreset {
    ChinaProper,
    ChinaMerc,
    ChinaLambert,
    EuroAsia,
    Europe,
    NorthPac,
    NorthAmerica,
    NorthPolar,
    SouthPolar,
}

impl MapPreset {
    pub const ALL: [MapPreset; 9] = [
        MapPreset::ChinaProper,
        MapPreset::ChinaMerc,
        MapPreset::ChinaLambert,
        MapPreset::EuroAsia,
        MapPreset::Europe,
        MapPreset::NorthPac,
        MapPreset::NorthAmerica,
        MapPreset::NorthPolar,
        MapPreset::SouthPolar,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MapPreset::ChinaProper => "chinaproper",
            MapPreset::ChinaMerc => "chinamerc",
            MapPreset::ChinaLambert => "chinalambert",
            MapPreset::EuroAsia => "euroasia",
            MapPreset::Europe => "europe",
            MapPreset::NorthPac => "northpac",
            MapPreset::NorthAmerica => "northamerica",
            MapPreset::NorthPolar => "northpolar",
            MapPreset::SouthPolar => "southpolar",
        }
    }

    pub fn projection(&self) -> Projection {
        match self {
            MapPreset::ChinaProper => Projection::PlateCarree,
            MapPreset::ChinaMerc => Projection::Mercator,
            MapPreset::ChinaLambert
            | MapPreset::EuroAsia
            | MapPreset::NorthPac
            | MapPreset::NorthAmerica => Projection::LambertConformal,
            MapPreset::Europe => Projection::Miller,
            MapPreset::NorthPolar => Projection::NorthPolarStereo,
            MapPreset::SouthPolar => Projection::SouthPolarStereo,
        }
    }

    /// `(lat_min, lat_max, lon_min, lon_max)`
    pub fn georange(&self) -> (f64, f64, f64, f64) {
        match self {
            MapPreset::ChinaProper => (20.0, 40.0, 100.0, 130.0),
            MapPreset::ChinaMerc => (15.0, 50.0, 72.5, 135.0),
            MapPreset::ChinaLambert => (15.0, 55.0, 80.0, 125.0),
            MapPreset::EuroAsia => (5.0, 75.0, 55.0, 145.0),
            MapPreset::Europe => (30.0, 70.0, -25.0, 45.0),
            MapPreset::NorthPac => (-5.0, 70.0, 120.0, 250.0),
            MapPreset::NorthAmerica => (5.0, 75.0, -145.0, -55.0),
            MapPreset::NorthPolar => (15.0, 90.0, -180.0, 180.0),
            MapPreset::SouthPolar => (-90.0, -15.0, -180.0, 180.0),
        }
    }

    pub fn region(&self) -> Result<GeometryRegion> {
        GeometryRegion::from_georange(self.georange())
    }

    pub fn projection_params(&self) -> BTreeMap<String, f64> {
        let lambert = |lon: f64, lat: f64, parallels: (f64, f64)| {
            BTreeMap::from([
                ("central_longitude".to_string(), lon),
                ("central_latitude".to_string(), lat),
                ("standard_parallel_1".to_string(), parallels.0),
                ("standard_parallel_2".to_string(), parallels.1),
            ])
        };
        let centred = |lon: f64| BTreeMap::from([("central_longitude".to_string(), lon)]);

        match self {
            MapPreset::ChinaProper | MapPreset::ChinaMerc => BTreeMap::new(),
            MapPreset::ChinaLambert => lambert(102.5, 40.0, (40.0, 40.0)),
            MapPreset::EuroAsia => lambert(100.0, 40.0, (40.0, 40.0)),
            MapPreset::Europe => centred(0.0),
            MapPreset::NorthPac => lambert(185.0, 42.5, (0.0, 40.0)),
            MapPreset::NorthAmerica => lambert(-100.0, 40.0, (40.0, 40.0)),
            MapPreset::NorthPolar | MapPreset::SouthPolar => centred(105.0),
        }
    }
}

impl FromStr for MapPreset {
    type Err = MapSetError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        MapPreset::ALL
            .into_iter()
            .find(|preset| preset.key() == lower)
            .ok_or_else(|| MapSetError::InvalidArgument(format!("unknown map preset '{s}'")))
    }
}

/// Configuration for [`MapSet::from_natural_earth`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSetConfig {
    /// Dataset scale (default 50m)
    pub resolution: Resolution,
    /// Projection recorded on the map set (default PlateCarree)
    pub projection: Projection,
    pub coastline: bool,
    pub country: bool,
    pub land: bool,
    pub ocean: bool,
    pub build: BuildOptions,
    /// Extra projection parameters such as `central_longitude`
    pub projection_params: BTreeMap<String, f64>,
}

impl Default for MapSetConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Medium,
            projection: Projection::PlateCarree,
            coastline: true,
            country: true,
            land: false,
            ocean: false,
            build: BuildOptions::default(),
            projection_params: BTreeMap::new(),
        }
    }
}

impl MapSetConfig {
    /// Natural Earth layers enabled by this configuration
    pub fn enabled_layers(&self) -> Vec<Layer> {
        [
            (Layer::Coastline, self.coastline),
            (Layer::Country, self.country),
            (Layer::Land, self.land),
            (Layer::Ocean, self.ocean),
        ]
        .into_iter()
        .filter_map(|(layer, enabled)| enabled.then_some(layer))
        .collect()
    }
}

/// Cached layers sharing one region and projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSet {
    projection: Projection,
    region: GeometryRegion,
    resolution: Resolution,
    projection_params: BTreeMap<String, f64>,
    layers: BTreeMap<Layer, CachedFeature>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapSet {
    /// Empty map set; attach layers with [`with_layer`](Self::with_layer)
    pub fn new(projection: Projection, region: GeometryRegion, resolution: Resolution) -> Self {
        Self {
            projection,
            region,
            resolution,
            projection_params: BTreeMap::new(),
            layers: BTreeMap::new(),
        }
    }

    /// Build every Natural Earth layer enabled in `config`, in parallel
    ///
    /// Fails as a whole if any layer fails.
    pub fn from_natural_earth<P: GeometryProvider + ?Sized>(
        provider: &P,
        region: GeometryRegion,
        config: &MapSetConfig,
    ) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("mapset::from_natural_earth");

        let features: Vec<(Layer, CachedFeature)> = config
            .enabled_layers()
            .into_par_iter()
            .map(|layer| -> Result<(Layer, CachedFeature)> {
                let source = layer
                    .natural_earth_source(config.resolution)
                    .ok_or_else(|| {
                        MapSetError::InvalidArgument(format!(
                            "layer {layer} has no Natural Earth source"
                        ))
                    })?;
                let feature = CachedFeature::build(provider, &source, region, &config.build)?;
                Ok((layer, feature))
            })
            .collect::<Result<_>>()?;

        tracing::info!(
            "Built map set for {} with {} layers ({})",
            region,
            features.len(),
            config.resolution
        );

        Ok(Self {
            projection: config.projection,
            region,
            resolution: config.resolution,
            projection_params: config.projection_params.clone(),
            layers: features.into_iter().collect(),
        })
    }

    /// Build a map set for a built-in region
    ///
    /// The preset decides region and projection; its projection parameters are
    /// overridden by any set in `config`.
    pub fn from_preset<P: GeometryProvider + ?Sized>(
        provider: &P,
        preset: MapPreset,
        config: &MapSetConfig,
    ) -> Result<Self> {
        let mut projection_params = preset.projection_params();
        projection_params.extend(
            config
                .projection_params
                .iter()
                .map(|(k, v)| (k.clone(), *v)),
        );
        let config = MapSetConfig {
            projection: preset.projection(),
            projection_params,
            ..config.clone()
        };
        Self::from_natural_earth(provider, preset.region()?, &config)
    }

    /// Attach (or replace) a layer built elsewhere, e.g. provinces from a custom
    /// dataset
    ///
    /// # Errors
    /// `InvalidArgument` if the feature was built for a different region.
    pub fn with_layer(mut self, layer: Layer, feature: CachedFeature) -> Result<Self> {
        if feature.region() != self.region {
            return Err(MapSetError::InvalidArgument(format!(
                "{layer} layer was built for {}, map set covers {}",
                feature.region(),
                self.region
            )));
        }
        self.layers.insert(layer, feature);
        Ok(self)
    }

    pub fn with_projection_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.projection_params.insert(key.into(), value);
        self
    }

    #[inline]
    pub fn layer(&self, layer: Layer) -> Option<&CachedFeature> {
        self.layers.get(&layer)
    }

    /// Present layers in [`Layer`] order
    pub fn layers(&self) -> impl Iterator<Item = (Layer, &CachedFeature)> {
        self.layers.iter().map(|(layer, feature)| (*layer, feature))
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    pub fn region(&self) -> GeometryRegion {
        self.region
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn projection_params(&self) -> &BTreeMap<String, f64> {
        &self.projection_params
    }

    /// Explicit `central_longitude` parameter, or the region's centre
    pub fn central_longitude(&self) -> f64 {
        self.projection_params
            .get("central_longitude")
            .copied()
            .unwrap_or_else(|| self.region.central_longitude())
    }

    /// Persist the map set atomically at `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::write(path.as_ref(), persist::PayloadKind::MapSet, self)
    }

    /// Load a map set written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        persist::read(path.as_ref(), persist::PayloadKind::MapSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, InMemoryProvider};
    use geo::{Geometry, LineString};
    use tempfile::TempDir;

    fn line(points: &[(f64, f64)]) -> Geometry<f64> {
        Geometry::LineString(LineString::from(points.to_vec()))
    }

    fn test_provider() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_collection(
                GeometrySource::coastline(Resolution::Medium),
                vec![
                    line(&[(115.0, 20.0), (118.0, 24.0)]),
                    line(&[(0.0, 50.0), (5.0, 52.0)]),
                    line(&[(175.0, 10.0), (179.0, 12.0)]),
                ],
            )
            .with_collection(
                GeometrySource::country_borders(Resolution::Medium),
                vec![
                    line(&[(120.0, 30.0), (125.0, 32.0)]),
                    line(&[(-170.0, 60.0), (-165.0, 62.0)]),
                ],
            )
    }

    fn china_coast() -> GeometryRegion {
        GeometryRegion::new(15.0, 35.0, 110.0, 135.0).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = MapSetConfig::default();
        assert_eq!(config.resolution, Resolution::Medium);
        assert_eq!(config.projection, Projection::PlateCarree);
        assert_eq!(
            config.enabled_layers(),
            vec![Layer::Coastline, Layer::Country]
        );
    }

    #[test]
    fn test_from_natural_earth() {
        let mapset =
            MapSet::from_natural_earth(&test_provider(), china_coast(), &MapSetConfig::default())
                .unwrap();

        assert_eq!(mapset.layer(Layer::Coastline).unwrap().len(), 1);
        assert_eq!(mapset.layer(Layer::Country).unwrap().len(), 1);
        assert!(mapset.layer(Layer::Land).is_none());
        assert_eq!(mapset.central_longitude(), 122.5);

        let names: Vec<Layer> = mapset.layers().map(|(layer, _)| layer).collect();
        assert_eq!(names, vec![Layer::Coastline, Layer::Country]);
    }

    #[test]
    fn test_missing_layer_fails_whole_build() {
        let config = MapSetConfig {
            land: true,
            ..MapSetConfig::default()
        };
        let result = MapSet::from_natural_earth(&test_provider(), china_coast(), &config);
        assert!(matches!(result, Err(MapSetError::UnknownSource(_))));
    }

    #[test]
    fn test_from_preset_across_antimeridian() {
        let mapset = MapSet::from_preset(
            &test_provider(),
            MapPreset::NorthPac,
            &MapSetConfig::default(),
        )
        .unwrap();

        assert!(mapset.region().straddles_antimeridian());
        assert_eq!(mapset.projection(), Projection::LambertConformal);
        assert_eq!(mapset.central_longitude(), 185.0);
        // Coastline near 175E; borders near 120E and 170W
        assert_eq!(mapset.layer(Layer::Coastline).unwrap().len(), 1);
        assert_eq!(mapset.layer(Layer::Country).unwrap().len(), 2);
    }

    #[test]
    fn test_preset_params_overridden_by_config() {
        let config = MapSetConfig {
            projection_params: BTreeMap::from([("central_longitude".to_string(), 150.0)]),
            ..MapSetConfig::default()
        };
        let mapset = MapSet::from_preset(&test_provider(), MapPreset::NorthPac, &config).unwrap();
        assert_eq!(mapset.central_longitude(), 150.0);
        assert_eq!(mapset.projection_params()["central_latitude"], 42.5);
    }

    #[test]
    fn test_with_layer_checks_region() {
        let province_source = GeometrySource::new(Category::Cultural, "province", Resolution::Fine);
        let collection = vec![line(&[(113.0, 22.0), (114.0, 23.0)])];

        let matching = CachedFeature::build_from_collection(
            province_source.clone(),
            china_coast(),
            &collection,
            &BuildOptions::default(),
        );
        let other_region = GeometryRegion::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let mismatched = CachedFeature::build_from_collection(
            province_source,
            other_region,
            &collection,
            &BuildOptions::default(),
        );

        let mapset = MapSet::new(Projection::PlateCarree, china_coast(), Resolution::Fine)
            .with_layer(Layer::Province, matching)
            .unwrap();
        assert_eq!(mapset.layer(Layer::Province).unwrap().len(), 1);

        let result = mapset.with_layer(Layer::County, mismatched);
        assert!(matches!(result, Err(MapSetError::InvalidArgument(_))));
    }

    #[test]
    fn test_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("china.mapset");

        let mapset =
            MapSet::from_natural_earth(&test_provider(), china_coast(), &MapSetConfig::default())
                .unwrap()
                .with_projection_param("central_longitude", 120.0);
        mapset.save(&path).unwrap();

        let loaded = MapSet::load(&path).unwrap();
        assert_eq!(loaded, mapset);

        // A map set file is not a feature file
        assert!(matches!(
            CachedFeature::load(&path),
            Err(MapSetError::CorruptCache { .. })
        ));
    }

    #[test]
    fn test_parsing() {
        assert_eq!("ml".parse::<Projection>().unwrap(), Projection::Miller);
        assert_eq!("M".parse::<Projection>().unwrap(), Projection::Mercator);
        assert_eq!(
            "lcc".parse::<Projection>().unwrap(),
            Projection::LambertConformal
        );
        assert_eq!(
            "NorthPolarStereo".parse::<Projection>().unwrap(),
            Projection::NorthPolarStereo
        );
        assert!("robinson".parse::<Projection>().is_err());

        assert_eq!("Europe".parse::<MapPreset>().unwrap(), MapPreset::Europe);
        assert!("atlantis".parse::<MapPreset>().is_err());

        assert_eq!("county".parse::<Layer>().unwrap(), Layer::County);
        assert!("rivers".parse::<Layer>().is_err());
    }

    #[test]
    fn test_all_presets_are_valid_regions() {
        for preset in MapPreset::ALL {
            assert!(preset.region().is_ok(), "{} is invalid", preset.key());
        }
    }
}
