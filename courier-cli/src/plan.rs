//! Plan command implementation for the courier CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveTime, Timelike};
use clap::Parser;
use courier_core::{
    Coordinate, Itinerary, NearestNeighbourSequencer, Sequencer, Stop, StopId, format_clock,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{open_utf8_file, require_existing};
use crate::{ARG_PLAN_OPTIMIZE, ARG_PLAN_PATH, ARG_PLAN_START, CliError, ENV_PLAN_PATH, write_json};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON plan holding an optional origin and a list of \
                 stops, optionally reorder the stops nearest-first from the \
                 origin, and print each leg's distance and projected arrival.",
    about = "Compute distances and arrival times for a stop list"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON plan file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan_path: Option<Utf8PathBuf>,
    /// Reorder stops nearest-first from the origin before planning.
    #[arg(
        long = ARG_PLAN_OPTIMIZE,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) optimize: Option<bool>,
    /// Departure time as HH:MM. Defaults to the current local time.
    #[arg(long = ARG_PLAN_START, value_name = "HH:MM")]
    #[serde(default)]
    pub(crate) start: Option<String>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    pub(crate) plan_path: Utf8PathBuf,
    pub(crate) optimize: bool,
    pub(crate) start: NaiveTime,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let plan_path = args.plan_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_PATH,
            env: ENV_PLAN_PATH,
        })?;
        let start = match args.start {
            Some(value) => parse_start(&value)?,
            None => current_minute(),
        };
        Ok(Self {
            plan_path,
            optimize: args.optimize.unwrap_or(false),
            start,
        })
    }
}

pub(crate) fn parse_start(value: &str) -> Result<NaiveTime, CliError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|source| {
        CliError::InvalidStartTime {
            value: value.to_owned(),
            source,
        }
    })
}

fn current_minute() -> NaiveTime {
    let now = Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}

/// On-disk plan: an optional origin and the stops in entry order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanFile {
    #[serde(default)]
    pub(crate) origin: Option<Coordinate>,
    pub(crate) stops: Vec<PlanStop>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanStop {
    pub(crate) address: String,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
}

/// Printed result of the `plan` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlanReport {
    pub(crate) origin: Option<Coordinate>,
    pub(crate) total_km: f64,
    pub(crate) legs: Vec<LegReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LegReport {
    pub(crate) position: usize,
    pub(crate) address: String,
    pub(crate) location: Coordinate,
    pub(crate) leg_km: f64,
    pub(crate) cumulative_km: f64,
    pub(crate) eta: String,
}

impl PlanReport {
    fn new(origin: Option<Coordinate>, itinerary: &Itinerary) -> Self {
        let legs = itinerary
            .legs
            .iter()
            .map(|leg| LegReport {
                position: leg.position,
                address: leg.stop.address.clone(),
                location: leg.stop.location,
                leg_km: leg.leg_km,
                cumulative_km: leg.cumulative_km,
                eta: format_clock(leg.eta),
            })
            .collect();
        Self {
            origin,
            total_km: itinerary.total_km(),
            legs,
        }
    }
}

pub(crate) fn run_plan_with(args: PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.plan_path, ARG_PLAN_PATH)?;
    let report = execute_plan(&config)?;
    write_json(writer, &report)
}

pub(crate) fn execute_plan(config: &PlanConfig) -> Result<PlanReport, CliError> {
    let plan = load_plan(&config.plan_path)?;
    let mut stops = plan_stops(&config.plan_path, plan.stops)?;
    if config.optimize {
        let origin = plan.origin.ok_or_else(|| CliError::OptimizeWithoutOrigin {
            path: config.plan_path.clone(),
        })?;
        stops = NearestNeighbourSequencer.sequence(origin, &stops);
    }
    tracing::debug!(
        stops = stops.len(),
        optimize = config.optimize,
        "planning itinerary"
    );
    let itinerary = Itinerary::plan(plan.origin, &stops, config.start);
    Ok(PlanReport::new(plan.origin, &itinerary))
}

/// Loads a JSON-encoded [`PlanFile`] from disk.
pub(crate) fn load_plan(path: &Utf8Path) -> Result<PlanFile, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlan {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParsePlan {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate plan entries and number them from 1 in file order.
fn plan_stops(path: &Utf8Path, entries: Vec<PlanStop>) -> Result<Vec<Stop>, CliError> {
    (1_u64..)
        .zip(entries)
        .enumerate()
        .map(|(index, (id, entry))| {
            let location =
                Coordinate::new(entry.lat, entry.lng).map_err(|source| CliError::InvalidStop {
                    path: path.to_path_buf(),
                    position: index + 1,
                    source,
                })?;
            Ok(Stop::new(StopId(id), entry.address, location))
        })
        .collect()
}
