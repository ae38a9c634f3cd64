//! Command-line interface for the courier route engine.
//!
//! Every subcommand merges its arguments with configuration files and
//! `COURIER_*` environment variables through `ortho_config`, then writes its
//! result to stdout.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod handoff;
mod plan;
mod search;
mod surface;

pub use error::CliError;

use handoff::HandoffArgs;
use plan::PlanArgs;
use search::{HttpGeocoderBuilder, SearchArgs};
use surface::SurfaceArgs;

pub(crate) const ARG_PLAN_PATH: &str = "plan-path";
pub(crate) const ARG_PLAN_OPTIMIZE: &str = "optimize";
pub(crate) const ARG_PLAN_START: &str = "start";
pub(crate) const ENV_PLAN_PATH: &str = "COURIER_CMDS_PLAN_PLAN_PATH";

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LNG: &str = "lng";
pub(crate) const ARG_HANDOFF_ADDRESS: &str = "address";
pub(crate) const ARG_HANDOFF_PLATFORM: &str = "platform";
pub(crate) const ENV_HANDOFF_LAT: &str = "COURIER_CMDS_HANDOFF_LAT";
pub(crate) const ENV_HANDOFF_LNG: &str = "COURIER_CMDS_HANDOFF_LNG";
pub(crate) const ENV_HANDOFF_ADDRESS: &str = "COURIER_CMDS_HANDOFF_ADDRESS";

pub(crate) const ARG_SEARCH_QUERY: &str = "query";
pub(crate) const ARG_SEARCH_KAKAO_REST_KEY: &str = "kakao-rest-key";
pub(crate) const ARG_SEARCH_KAKAO_BASE_URL: &str = "kakao-base-url";
pub(crate) const ARG_SEARCH_NOMINATIM_BASE_URL: &str = "nominatim-base-url";
pub(crate) const ENV_SEARCH_QUERY: &str = "COURIER_CMDS_SEARCH_QUERY";
pub(crate) const ENV_SEARCH_KAKAO_REST_KEY: &str = "COURIER_CMDS_SEARCH_KAKAO_REST_KEY";

pub(crate) const ARG_SURFACE_RESOURCE_URL: &str = "resource-url";
pub(crate) const ARG_SURFACE_KAKAO_APP_KEY: &str = "kakao-app-key";
pub(crate) const ARG_SURFACE_ZOOM: &str = "zoom";
pub(crate) const ARG_SURFACE_HIDE_USER: &str = "hide-user-location";
pub(crate) const ENV_SURFACE_RESOURCE_URL: &str = "COURIER_CMDS_SURFACE_RESOURCE_URL";
pub(crate) const ENV_SURFACE_LAT: &str = "COURIER_CMDS_SURFACE_LAT";
pub(crate) const ENV_SURFACE_LNG: &str = "COURIER_CMDS_SURFACE_LNG";

/// Run the courier CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Plan(args) => plan::run_plan_with(args, writer),
        Command::Handoff(args) => handoff::run_handoff_with(args, writer),
        Command::Search(args) => search::run_search_with(args, &HttpGeocoderBuilder, writer),
        Command::Surface(args) => surface::run_surface_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Plan delivery stops, hand off navigation and render the map surface",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute distances and arrival times for a stop list.
    Plan(PlanArgs),
    /// List navigation app URLs for a destination.
    Handoff(HandoffArgs),
    /// Search for places by name or address.
    Search(SearchArgs),
    /// Print the map surface bootstrap page.
    Surface(SurfaceArgs),
}

/// Serialise `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
