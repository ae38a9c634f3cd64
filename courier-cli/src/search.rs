//! Search command: Kakao Local with a Nominatim fallback.

use std::io::Write;

use clap::Parser;
use courier_core::{FallbackGeocoder, Geocoder, SearchOutcome};
use courier_data::geocoding::{
    KAKAO_LOCAL_BASE_URL, KakaoLocalConfig, KakaoLocalGeocoder, NOMINATIM_BASE_URL,
    NominatimConfig, NominatimGeocoder,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_SEARCH_KAKAO_BASE_URL, ARG_SEARCH_KAKAO_REST_KEY, ARG_SEARCH_NOMINATIM_BASE_URL,
    ARG_SEARCH_QUERY, CliError, ENV_SEARCH_KAKAO_REST_KEY, ENV_SEARCH_QUERY, write_json,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Search the Kakao Local API for a business, landmark or \
                 address. When Kakao finds nothing or fails, the query is \
                 retried against OpenStreetMap Nominatim. Results are printed \
                 as JSON with the resolver that produced them.",
    about = "Search for places by name or address"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct SearchArgs {
    /// Free-text query, at least two characters.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Kakao REST API key.
    #[arg(long = ARG_SEARCH_KAKAO_REST_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) kakao_rest_key: Option<String>,
    /// Override the Kakao Local API host.
    #[arg(long = ARG_SEARCH_KAKAO_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) kakao_base_url: Option<String>,
    /// Override the Nominatim host.
    #[arg(long = ARG_SEARCH_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    pub(crate) query: String,
    pub(crate) kakao_rest_key: String,
    pub(crate) kakao_base_url: String,
    pub(crate) nominatim_base_url: String,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args.query.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_QUERY,
            env: ENV_SEARCH_QUERY,
        })?;
        let kakao_rest_key = args.kakao_rest_key.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_KAKAO_REST_KEY,
            env: ENV_SEARCH_KAKAO_REST_KEY,
        })?;
        Ok(Self {
            query,
            kakao_rest_key,
            kakao_base_url: args
                .kakao_base_url
                .unwrap_or_else(|| KAKAO_LOCAL_BASE_URL.to_owned()),
            nominatim_base_url: args
                .nominatim_base_url
                .unwrap_or_else(|| NOMINATIM_BASE_URL.to_owned()),
        })
    }
}

/// Boxed primary/fallback pair used by the search command.
pub(crate) type SearchChain = FallbackGeocoder<Box<dyn Geocoder>, Box<dyn Geocoder>>;

/// Builds the geocoder chain for the current search invocation.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchChain, CliError>;
}

pub(crate) struct HttpGeocoderBuilder;

impl GeocoderBuilder for HttpGeocoderBuilder {
    fn build(&self, config: &SearchConfig) -> Result<SearchChain, CliError> {
        let kakao = KakaoLocalGeocoder::with_config(
            KakaoLocalConfig::new(config.kakao_rest_key.clone())
                .with_base_url(config.kakao_base_url.clone()),
        )
        .map_err(|source| CliError::BuildGeocoder {
            service: "Kakao Local",
            source,
        })?;
        let nominatim =
            NominatimGeocoder::with_config(NominatimConfig::new(config.nominatim_base_url.clone()))
                .map_err(|source| CliError::BuildGeocoder {
                    service: "Nominatim",
                    source,
                })?;
        Ok(FallbackGeocoder::new(Box::new(kakao), Box::new(nominatim)))
    }
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let outcome = execute_search(args, builder)?;
    write_json(writer, &outcome)
}

fn execute_search(
    args: SearchArgs,
    builder: &dyn GeocoderBuilder,
) -> Result<SearchOutcome, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = SearchConfig::try_from(merged)?;
    let geocoder = builder.build(&config)?;
    let outcome = geocoder.search(&config.query)?;
    tracing::info!(
        results = outcome.places.len(),
        source = ?outcome.source,
        "search complete"
    );
    Ok(outcome)
}
