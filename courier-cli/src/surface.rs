//! Surface command: render the map bootstrap page.

use std::io::Write;

use clap::Parser;
use courier_bridge::{BridgeConfig, SurfacePage};
use courier_core::Coordinate;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_LAT, ARG_LNG, ARG_SURFACE_HIDE_USER, ARG_SURFACE_KAKAO_APP_KEY, ARG_SURFACE_RESOURCE_URL,
    ARG_SURFACE_ZOOM, CliError, ENV_SURFACE_LAT, ENV_SURFACE_LNG, ENV_SURFACE_RESOURCE_URL,
};

/// CLI arguments for the `surface` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the HTML page a webview loads to host the map. The \
                 SDK comes from --resource-url, or from the Kakao Maps SDK \
                 when only --kakao-app-key is given.",
    about = "Print the map surface bootstrap page",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct SurfaceArgs {
    /// URL of the map SDK script.
    #[arg(long = ARG_SURFACE_RESOURCE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) resource_url: Option<String>,
    /// Kakao JavaScript app key, used when no resource URL is given.
    #[arg(long = ARG_SURFACE_KAKAO_APP_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) kakao_app_key: Option<String>,
    /// Initial centre latitude.
    #[arg(long = ARG_LAT, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Initial centre longitude.
    #[arg(long = ARG_LNG, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Initial zoom level; smaller is closer.
    #[arg(long = ARG_SURFACE_ZOOM, value_name = "level")]
    #[serde(default)]
    pub(crate) zoom: Option<u8>,
    /// Omit the courier position dot.
    #[arg(
        long = ARG_SURFACE_HIDE_USER,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) hide_user_location: Option<bool>,
}

/// Resolved `surface` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SurfaceConfig {
    pub(crate) resource_url: String,
    pub(crate) page: SurfacePage,
}

impl TryFrom<SurfaceArgs> for SurfaceConfig {
    type Error = CliError;

    fn try_from(args: SurfaceArgs) -> Result<Self, Self::Error> {
        let resource_url = resolve_resource_url(args.resource_url, args.kakao_app_key.as_deref())?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_SURFACE_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_SURFACE_LNG,
        })?;
        let mut page = SurfacePage::new(Coordinate::new(lat, lng)?)
            .with_user_location(!args.hide_user_location.unwrap_or(false));
        if let Some(zoom) = args.zoom {
            page = page.with_zoom_level(zoom);
        }
        Ok(Self { resource_url, page })
    }
}

fn resolve_resource_url(
    resource_url: Option<String>,
    kakao_app_key: Option<&str>,
) -> Result<String, CliError> {
    let missing = CliError::MissingArgument {
        field: ARG_SURFACE_RESOURCE_URL,
        env: ENV_SURFACE_RESOURCE_URL,
    };
    match (resource_url, kakao_app_key) {
        (Some(url), _) => Ok(url),
        (None, Some(key)) => BridgeConfig::kakao(key)
            .resource_urls
            .into_iter()
            .next()
            .ok_or(missing),
        (None, None) => Err(missing),
    }
}

pub(crate) fn run_surface_with(args: SurfaceArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = SurfaceConfig::try_from(merged)?;
    writer
        .write_all(config.page.render(&config.resource_url).as_bytes())
        .map_err(CliError::WriteOutput)
}
