//! Error types emitted by the courier CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use courier_core::{CoordinateError, ParsePlatformError, SearchError};
use courier_data::geocoding::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the courier CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the plan file failed.
    #[error("failed to open plan at {path:?}: {source}")]
    OpenPlan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Plan JSON could not be decoded.
    #[error("failed to parse plan JSON at {path:?}: {source}")]
    ParsePlan {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A stop in the plan file has an out-of-range coordinate.
    #[error("stop {position} in {path:?} has an invalid location: {source}")]
    InvalidStop {
        path: Utf8PathBuf,
        position: usize,
        #[source]
        source: CoordinateError,
    },
    /// Optimisation was requested for a plan without an origin.
    #[error("cannot optimise {path:?}: the plan has no origin")]
    OptimizeWithoutOrigin { path: Utf8PathBuf },
    /// The departure time was not `HH:MM`.
    #[error("invalid start time {value:?}; expected HH:MM")]
    InvalidStartTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A coordinate given on the command line is out of range.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    /// The platform name was not recognised.
    #[error(transparent)]
    InvalidPlatform(#[from] ParsePlatformError),
    /// Constructing a geocoder failed.
    #[error("failed to build {service} geocoder: {source}")]
    BuildGeocoder {
        service: &'static str,
        #[source]
        source: ProviderBuildError,
    },
    /// The search found nothing or the query was rejected.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
