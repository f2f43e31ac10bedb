use clap::{Args, Parser, Subcommand};
use mapset_lib::{Category, GeometryRegion, Layer, MapPreset, Projection, Resolution};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// MapSet Tool - build and inspect partial geometry caches for map figures
pub struct Settings {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a map set (several layers over one region) and save it
    Build(BuildArgs),
    /// Build a single cached feature and save it
    Feature(FeatureArgs),
    /// Print a summary of a cache file as JSON and check its contents
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Directory holding Natural Earth GeoJSON files
    #[clap(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Region as LATMIN,LATMAX,LONMIN,LONMAX (longitudes may exceed 180)
    #[clap(
        long,
        value_name = "LATMIN,LATMAX,LONMIN,LONMAX",
        allow_hyphen_values = true,
        required_unless_present = "preset",
        conflicts_with = "preset"
    )]
    pub georange: Option<GeometryRegion>,

    /// Built-in region (chinaproper, chinamerc, chinalambert, euroasia, europe,
    /// northpac, northamerica, northpolar, southpolar)
    #[clap(long, value_name = "NAME")]
    pub preset: Option<MapPreset>,

    /// Dataset scale: 110m, 50m or 10m
    #[clap(long, default_value = "50m")]
    pub resolution: Resolution,

    /// Projection recorded on the map set (presets bring their own)
    #[clap(long, conflicts_with = "preset")]
    pub projection: Option<Projection>,

    /// Include the land polygons layer
    #[clap(long, default_value = "false")]
    pub land: bool,

    /// Include the ocean polygons layer
    #[clap(long, default_value = "false")]
    pub ocean: bool,

    /// Skip the coastline layer
    #[clap(long, default_value = "false")]
    pub no_coastline: bool,

    /// Skip the country borders layer
    #[clap(long, default_value = "false")]
    pub no_country: bool,

    /// Extra layer read from a GeoJSON file, e.g. province=provinces.geojson
    #[clap(long = "layer", value_name = "NAME=PATH")]
    pub layers: Vec<LayerFile>,

    /// Drop the second copy of geometries crossing the antimeridian
    #[clap(long, default_value = "false")]
    pub dedup: bool,

    /// Where to write the map set
    #[clap(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct FeatureArgs {
    /// Directory holding Natural Earth GeoJSON files
    #[clap(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Dataset category: physical or cultural
    #[clap(long, default_value = "physical")]
    pub category: Category,

    /// Dataset name, e.g. coastline or admin_0_boundary_lines_land
    #[clap(long)]
    pub name: String,

    /// Dataset scale: 110m, 50m or 10m
    #[clap(long, default_value = "50m")]
    pub resolution: Resolution,

    /// Region as LATMIN,LATMAX,LONMIN,LONMAX (longitudes may exceed 180)
    #[clap(long, value_name = "LATMIN,LATMAX,LONMIN,LONMAX", allow_hyphen_values = true)]
    pub georange: GeometryRegion,

    /// Drop the second copy of geometries crossing the antimeridian
    #[clap(long, default_value = "false")]
    pub dedup: bool,

    /// Where to write the feature
    #[clap(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Map set or feature cache file
    #[clap(value_name = "FILE")]
    pub file: PathBuf,
}

/// `NAME=PATH` pair naming a custom layer and its GeoJSON file
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFile {
    pub layer: Layer,
    pub path: PathBuf,
}

impl FromStr for LayerFile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
        if path.is_empty() {
            return Err(format!("missing path for layer '{name}'"));
        }
        let layer = name.parse::<Layer>().map_err(|e| e.to_string())?;
        Ok(Self {
            layer,
            path: PathBuf::from(path),
        })
    }
}
