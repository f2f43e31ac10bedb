use crate::{BuildArgs, FeatureArgs, ToolError};
use mapset_lib::{
    AntimeridianPolicy, BuildOptions, CachedFeature, Category, GeometrySource, Layer, MapSet,
    MapSetConfig, NaturalEarthDirectory, Resolution,
};

fn build_options(dedup: bool) -> BuildOptions {
    BuildOptions {
        antimeridian: if dedup {
            AntimeridianPolicy::Deduplicate
        } else {
            AntimeridianPolicy::Concatenate
        },
    }
}

/// Source key under which a `--layer NAME=PATH` file is registered
fn custom_source(layer: Layer, resolution: Resolution) -> GeometrySource {
    GeometrySource::new(Category::Cultural, layer.as_str(), resolution)
}

/// Build the map set described by `args` and save it to `args.output`
pub fn build_mapset(args: &BuildArgs) -> Result<MapSet, ToolError> {
    let options = build_options(args.dedup);
    let config = MapSetConfig {
        resolution: args.resolution,
        projection: args.projection.unwrap_or_default(),
        coastline: !args.no_coastline,
        country: !args.no_country,
        land: args.land,
        ocean: args.ocean,
        build: options.clone(),
        ..MapSetConfig::default()
    };

    let mut provider = NaturalEarthDirectory::new(&args.data_dir);
    for file in &args.layers {
        provider = provider.with_file(custom_source(file.layer, args.resolution), &file.path);
    }

    let mut mapset = match (args.preset, args.georange) {
        (Some(preset), _) => MapSet::from_preset(&provider, preset, &config)?,
        (None, Some(region)) => MapSet::from_natural_earth(&provider, region, &config)?,
        (None, None) => return Err(ToolError::MissingRegion),
    };

    for file in &args.layers {
        let source = custom_source(file.layer, args.resolution);
        let feature = CachedFeature::build(&provider, &source, mapset.region(), &options)?;
        mapset = mapset.with_layer(file.layer, feature)?;
    }

    mapset.save(&args.output)?;
    tracing::info!(
        "Map set for {} ({} layers, {}) written to {}",
        mapset.region(),
        mapset.layers().count(),
        mapset.projection(),
        args.output.display()
    );
    Ok(mapset)
}

/// Build the single feature described by `args` and save it to `args.output`
pub fn build_feature(args: &FeatureArgs) -> Result<CachedFeature, ToolError> {
    let provider = NaturalEarthDirectory::new(&args.data_dir);
    let source = GeometrySource::new(args.category, args.name.clone(), args.resolution);
    let feature =
        CachedFeature::build(&provider, &source, args.georange, &build_options(args.dedup))?;

    feature.save(&args.output)?;
    tracing::info!(
        "{} geometries of {} within {} written to {}",
        feature.len(),
        source,
        feature.region(),
        args.output.display()
    );
    Ok(feature)
}
