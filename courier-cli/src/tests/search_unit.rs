//! Unit tests for the search command.

use super::*;
use crate::search::{
    GeocoderBuilder, HttpGeocoderBuilder, SearchArgs, SearchChain, SearchConfig, run_search_with,
};
use courier_core::test_support::{StubGeocoder, sample_place};
use courier_core::{FallbackGeocoder, Place, SearchError};
use courier_data::geocoding::{KAKAO_LOCAL_BASE_URL, NOMINATIM_BASE_URL};
use rstest::{fixture, rstest};

struct StubGeocoderBuilder {
    primary: Vec<Place>,
    fallback: Vec<Place>,
}

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, _config: &SearchConfig) -> Result<SearchChain, CliError> {
        Ok(FallbackGeocoder::new(
            Box::new(StubGeocoder::with_places(self.primary.clone())),
            Box::new(StubGeocoder::with_places(self.fallback.clone())),
        ))
    }
}

#[fixture]
fn args() -> SearchArgs {
    SearchArgs {
        query: Some("city hall".into()),
        kakao_rest_key: Some("rest-key".into()),
        ..SearchArgs::default()
    }
}

#[rstest]
fn base_urls_default_to_public_services(args: SearchArgs) {
    let config = SearchConfig::try_from(args).expect("config should build");
    assert_eq!(config.kakao_base_url, KAKAO_LOCAL_BASE_URL);
    assert_eq!(config.nominatim_base_url, NOMINATIM_BASE_URL);
}

#[rstest]
fn missing_query_errors(args: SearchArgs) {
    match SearchConfig::try_from(SearchArgs {
        query: None,
        ..args
    }) {
        Err(CliError::MissingArgument { field, .. }) => assert_eq!(field, ARG_SEARCH_QUERY),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn missing_kakao_key_errors(args: SearchArgs) {
    match SearchConfig::try_from(SearchArgs {
        kakao_rest_key: None,
        ..args
    }) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, ARG_SEARCH_KAKAO_REST_KEY);
            assert_eq!(env, ENV_SEARCH_KAKAO_REST_KEY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn prints_fallback_results_with_their_source(args: SearchArgs) {
    let builder = StubGeocoderBuilder {
        primary: Vec::new(),
        fallback: vec![sample_place("City Hall")],
    };
    let mut stdout = Vec::new();
    run_search_with(args, &builder, &mut stdout).expect("search should succeed");

    let output: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON output");
    assert_eq!(output["source"], "fallback");
    assert_eq!(output["places"][0]["name"], "City Hall");
}

#[rstest]
fn short_queries_are_rejected(args: SearchArgs) {
    let builder = StubGeocoderBuilder {
        primary: vec![sample_place("City Hall")],
        fallback: Vec::new(),
    };
    let mut stdout = Vec::new();
    let err = run_search_with(
        SearchArgs {
            query: Some(" x ".into()),
            ..args
        },
        &builder,
        &mut stdout,
    )
    .expect_err("one character is too short");
    assert!(matches!(err, CliError::Search(SearchError::QueryTooShort)));
    assert!(stdout.is_empty());
}

#[rstest]
fn empty_results_from_both_services_are_an_error(args: SearchArgs) {
    let builder = StubGeocoderBuilder {
        primary: Vec::new(),
        fallback: Vec::new(),
    };
    let mut stdout = Vec::new();
    let err = run_search_with(args, &builder, &mut stdout).expect_err("nothing found");
    assert!(matches!(
        err,
        CliError::Search(SearchError::NoResults {
            primary: None,
            fallback: None
        })
    ));
}

#[rstest]
fn http_builder_rejects_blank_kakao_key(args: SearchArgs) {
    let config = SearchConfig::try_from(SearchArgs {
        kakao_rest_key: Some("  ".into()),
        ..args
    })
    .expect("config should build");
    match HttpGeocoderBuilder.build(&config) {
        Err(CliError::BuildGeocoder { service, .. }) => assert_eq!(service, "Kakao Local"),
        Err(other) => panic!("expected BuildGeocoder, found {other:?}"),
        Ok(_) => panic!("blank key should be rejected"),
    }
}
