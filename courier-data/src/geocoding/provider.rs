//! HTTP-backed [`Geocoder`] and [`ReverseGeocoder`] implementations.
//!
//! The core traits are synchronous to keep the engine embeddable in
//! synchronous hosts. Each geocoder owns a `reqwest` client and a
//! current-thread Tokio runtime and blocks on its requests internally.

use std::future::Future;
use std::time::Duration;

use courier_core::{Coordinate, GeocodeError, Geocoder, Place, ReverseGeocoder};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::kakao::{AddressResponse, Coord2AddressResponse, KeywordResponse};
use super::nominatim::{self, NominatimPlace};

/// Default user agent for geocoding requests.
pub const DEFAULT_USER_AGENT: &str = "courier-engine/0.1";

/// Results requested per search, matching what fits in the result sheet.
pub const DEFAULT_PAGE_SIZE: u8 = 7;

/// Production Kakao Local API host.
pub const KAKAO_LOCAL_BASE_URL: &str = "https://dapi.kakao.com";

/// Public OpenStreetMap Nominatim instance.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error type for geocoder construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The Kakao REST API key was blank.
    #[error("Kakao REST API key must not be empty")]
    MissingApiKey,
}

/// Client and runtime shared by the HTTP geocoders.
struct HttpBackend {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpBackend {
    fn build(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    /// Run `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded runtime the caller's runtime is used through
    /// `block_in_place`; anywhere else the owned runtime drives the future.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<T, GeocodeError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        response
            .json::<T>()
            .await
            .map_err(|err| GeocodeError::Parse {
                message: err.to_string(),
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        GeocodeError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Configuration for [`KakaoLocalGeocoder`].
#[derive(Debug, Clone)]
pub struct KakaoLocalConfig {
    /// Base URL of the Kakao Local API.
    pub base_url: String,
    /// REST API key sent as `Authorization: KakaoAK <key>`.
    pub rest_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Results per search request.
    pub page_size: u8,
}

impl KakaoLocalConfig {
    /// Create a configuration for the production API with `rest_key`.
    #[must_use]
    pub fn new(rest_key: impl Into<String>) -> Self {
        Self {
            base_url: KAKAO_LOCAL_BASE_URL.to_owned(),
            rest_key: rest_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Point at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of results per search.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Kakao Local API geocoder.
///
/// Searches are keyword searches first (businesses and landmarks) and fall
/// back to address searches when the keyword search finds nothing. Reverse
/// lookups return the road address, else the lot address.
#[derive(Debug)]
pub struct KakaoLocalGeocoder {
    backend: HttpBackend,
    config: KakaoLocalConfig,
}

impl KakaoLocalGeocoder {
    /// Create a geocoder for the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(rest_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(KakaoLocalConfig::new(rest_key))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: KakaoLocalConfig) -> Result<Self, ProviderBuildError> {
        if config.rest_key.trim().is_empty() {
            return Err(ProviderBuildError::MissingApiKey);
        }
        let backend = HttpBackend::build(&config.user_agent, config.timeout)?;
        Ok(Self { backend, config })
    }

    fn authorization(&self) -> String {
        format!("KakaoAK {}", self.config.rest_key.trim())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GeocodeError> {
        let url = endpoint(&self.config.base_url, path);
        let authorization = self.authorization();
        self.backend
            .get_json(&url, query, Some(&authorization))
            .await
    }

    async fn search_async(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let size = self.config.page_size.to_string();
        let params = [("query", query), ("size", size.as_str())];

        let keyword: KeywordResponse = self.get("/v2/local/search/keyword.json", &params).await?;
        let places = keyword.into_places();
        if !places.is_empty() {
            return Ok(places);
        }

        log::debug!("no keyword matches for {query:?}; trying address search");
        let address: AddressResponse = self.get("/v2/local/search/address.json", &params).await?;
        Ok(address.into_places())
    }

    async fn reverse_async(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        let x = at.lng().to_string();
        let y = at.lat().to_string();
        let response: Coord2AddressResponse = self
            .get("/v2/local/geo/coord2address.json", &[("x", &x), ("y", &y)])
            .await?;
        Ok(response.into_address())
    }
}

impl Geocoder for KakaoLocalGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        self.backend.block_on(self.search_async(query))
    }
}

impl ReverseGeocoder for KakaoLocalGeocoder {
    fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        self.backend.block_on(self.reverse_async(at))
    }
}

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string; public instances reject anonymous clients.
    pub user_agent: String,
    /// Results per search request.
    pub limit: u8,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NominatimConfig {
    /// Create a configuration for the instance at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of results per search.
    #[must_use]
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }
}

/// OpenStreetMap Nominatim geocoder, used as the search fallback.
#[derive(Debug)]
pub struct NominatimGeocoder {
    backend: HttpBackend,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder for the public instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimConfig::default())
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: NominatimConfig) -> Result<Self, ProviderBuildError> {
        let backend = HttpBackend::build(&config.user_agent, config.timeout)?;
        Ok(Self { backend, config })
    }

    async fn search_async(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = endpoint(&self.config.base_url, "/search");
        let limit = self.config.limit.to_string();
        let results: Vec<NominatimPlace> = self
            .backend
            .get_json(
                &url,
                &[("format", "json"), ("limit", &limit), ("q", query)],
                None,
            )
            .await?;
        Ok(nominatim::into_places(results, query))
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        self.backend.block_on(self.search_async(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://dapi.kakao.com", "https://dapi.kakao.com/v2/local/search/keyword.json")]
    #[case("https://dapi.kakao.com/", "https://dapi.kakao.com/v2/local/search/keyword.json")]
    fn endpoint_joins_without_double_slash(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(endpoint(base, "/v2/local/search/keyword.json"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_kakao_key_is_rejected(#[case] key: &str) {
        assert!(matches!(
            KakaoLocalGeocoder::new(key),
            Err(ProviderBuildError::MissingApiKey)
        ));
    }

    #[rstest]
    fn kakao_authorization_uses_kakaoak_scheme() {
        let geocoder = KakaoLocalGeocoder::new(" secret ").expect("geocoder should build");
        assert_eq!(geocoder.authorization(), "KakaoAK secret");
    }

    #[rstest]
    fn kakao_config_builder_overrides_defaults() {
        let config = KakaoLocalConfig::new("key")
            .with_base_url("http://localhost:9000")
            .with_timeout(Duration::from_secs(2))
            .with_user_agent("courier-test/1.0")
            .with_page_size(3);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "courier-test/1.0");
        assert_eq!(config.page_size, 3);
    }

    #[rstest]
    fn nominatim_defaults_to_public_instance() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, NOMINATIM_BASE_URL);
        assert_eq!(config.limit, DEFAULT_PAGE_SIZE);
    }

    #[rstest]
    fn unreachable_service_is_a_network_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let config = NominatimConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let geocoder = NominatimGeocoder::with_config(config).expect("geocoder should build");
        let err = geocoder.search("anything").expect_err("nothing listens on port 9");
        assert!(
            matches!(
                err,
                GeocodeError::Network { .. } | GeocodeError::Timeout { .. }
            ),
            "unexpected error {err:?}"
        );
    }
}
