//! Handoff command: list navigation URLs for a destination.

use std::io::Write;

use clap::Parser;
use courier_core::{Coordinate, Platform, Stop, StopId, navigation_candidates};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_HANDOFF_ADDRESS, ARG_HANDOFF_PLATFORM, ARG_LAT, ARG_LNG, CliError, ENV_HANDOFF_ADDRESS,
    ENV_HANDOFF_LAT, ENV_HANDOFF_LNG,
};

/// CLI arguments for the `handoff` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the URLs a device would try, in order, to open \
                 turn-by-turn navigation to a destination: the navigation \
                 app's deep links first, then the platform's store listing.",
    about = "List navigation app URLs for a destination",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct HandoffArgs {
    /// Destination latitude.
    #[arg(long = ARG_LAT, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Destination longitude.
    #[arg(long = ARG_LNG, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Destination name passed to the navigation app.
    #[arg(long = ARG_HANDOFF_ADDRESS, value_name = "text")]
    #[serde(default)]
    pub(crate) address: Option<String>,
    /// Device platform: android (default) or ios.
    #[arg(long = ARG_HANDOFF_PLATFORM, value_name = "name")]
    #[serde(default)]
    pub(crate) platform: Option<String>,
}

/// Resolved `handoff` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HandoffConfig {
    pub(crate) destination: Stop,
    pub(crate) platform: Platform,
}

impl TryFrom<HandoffArgs> for HandoffConfig {
    type Error = CliError;

    fn try_from(args: HandoffArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_HANDOFF_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_HANDOFF_LNG,
        })?;
        let address = args.address.ok_or(CliError::MissingArgument {
            field: ARG_HANDOFF_ADDRESS,
            env: ENV_HANDOFF_ADDRESS,
        })?;
        let platform = args
            .platform
            .as_deref()
            .map(str::parse::<Platform>)
            .transpose()?
            .unwrap_or_default();
        let location = Coordinate::new(lat, lng)?;
        Ok(Self {
            destination: Stop::new(StopId(0), address, location),
            platform,
        })
    }
}

pub(crate) fn run_handoff_with(args: HandoffArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = HandoffConfig::try_from(merged)?;
    write_candidates(writer, &config)
}

pub(crate) fn write_candidates(
    writer: &mut dyn Write,
    config: &HandoffConfig,
) -> Result<(), CliError> {
    for url in navigation_candidates(&config.destination, config.platform) {
        writeln!(writer, "{url}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}
