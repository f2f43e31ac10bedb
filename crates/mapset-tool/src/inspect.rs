use crate::ToolError;
use mapset_lib::{CachedFeature, GeometryRegion, MapSet, PayloadKind, peek_kind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Summary of a cache file
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// `feature` or `mapset`
    pub kind: &'static str,
    /// `[lat_min, lat_max, lon_min, lon_max]`
    pub region: GeometryRegion,
    pub straddles_antimeridian: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    pub resolution: String,
    pub central_longitude: f64,
    pub projection_params: BTreeMap<String, f64>,
    pub layers: Vec<LayerReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub layer: String,
    pub source: String,
    pub geometries: usize,
    /// `[lat_min, lat_max, lon_min, lon_max]` of the stored geometries
    pub extent: Option<[f64; 4]>,
    /// Stored geometries that do not intersect the region. Always 0 for a sound file.
    pub outside_region: usize,
}

impl LayerReport {
    fn new(layer: impl Into<String>, feature: &CachedFeature) -> Self {
        let region = feature.region();
        Self {
            layer: layer.into(),
            source: feature.source().to_string(),
            geometries: feature.len(),
            extent: feature.bounding_rect().map(|rect| {
                let (min, max) = (rect.min(), rect.max());
                [min.y, max.y, min.x, max.x]
            }),
            outside_region: feature
                .iter()
                .filter(|geometry| !region.intersects(geometry))
                .count(),
        }
    }
}

impl InspectReport {
    /// Fails if any layer holds a geometry outside its region
    pub fn check(&self) -> Result<(), ToolError> {
        match self.layers.iter().find(|layer| layer.outside_region > 0) {
            Some(layer) => Err(ToolError::OutsideRegion {
                layer: layer.layer.clone(),
                count: layer.outside_region,
            }),
            None => Ok(()),
        }
    }
}

/// Load the cache file at `path`, whatever it holds, and summarise it
pub fn inspect(path: &Path) -> Result<InspectReport, ToolError> {
    let report = match peek_kind(path)? {
        PayloadKind::Feature => {
            let feature = CachedFeature::load(path)?;
            let region = feature.region();
            InspectReport {
                kind: "feature",
                region,
                straddles_antimeridian: region.straddles_antimeridian(),
                projection: None,
                resolution: feature.source().resolution.to_string(),
                central_longitude: region.central_longitude(),
                projection_params: BTreeMap::new(),
                layers: vec![LayerReport::new(feature.source().name.clone(), &feature)],
            }
        }
        PayloadKind::MapSet => {
            let mapset = MapSet::load(path)?;
            let region = mapset.region();
            InspectReport {
                kind: "mapset",
                region,
                straddles_antimeridian: region.straddles_antimeridian(),
                projection: Some(mapset.projection().to_string()),
                resolution: mapset.resolution().to_string(),
                central_longitude: mapset.central_longitude(),
                projection_params: mapset.projection_params().clone(),
                layers: mapset
                    .layers()
                    .map(|(layer, feature)| LayerReport::new(layer.as_str(), feature))
                    .collect(),
            }
        }
    };

    tracing::debug!(
        "Inspected {} ({} layers)",
        path.display(),
        report.layers.len()
    );
    Ok(report)
}
