//! MapSet Tool - command-line front end for the partial geometry cache
//!
//! Builds cached features and map sets from a directory of Natural Earth GeoJSON
//! files, saves them, and inspects saved cache files.

mod commands;
mod inspect;
mod logging;
mod settings;

pub use commands::{build_feature, build_mapset};
pub use inspect::{InspectReport, LayerReport, inspect};
pub use logging::setup_logging;
pub use settings::{BuildArgs, Command, FeatureArgs, InspectArgs, LayerFile, Settings};

use mapset_lib::MapSetError;

/// Error types for the command-line tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    MapSet(#[from] MapSetError),

    #[error("A region is required: pass --georange or --preset")]
    MissingRegion,

    #[error("{count} geometries of layer '{layer}' do not intersect the cached region")]
    OutsideRegion { layer: String, count: usize },

    #[error("Cannot encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Run one parsed command
pub fn run(settings: &Settings) -> Result<(), ToolError> {
    match &settings.command {
        Command::Build(args) => {
            build_mapset(args)?;
        }
        Command::Feature(args) => {
            build_feature(args)?;
        }
        Command::Inspect(args) => {
            let report = inspect(&args.file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            report.check()?;
        }
    }
    Ok(())
}
