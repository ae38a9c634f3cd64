//! Address resolution collaborators.
//!
//! The engine treats geocoding services as black boxes: free text goes in,
//! candidate places come out. [`FallbackGeocoder`] chains a primary and a
//! secondary resolver the way the courier app searches: an empty answer and
//! a transport failure are handled identically.

use serde::Serialize;
use thiserror::Error;

use crate::Coordinate;

/// Minimum number of characters (after trimming) a search query must have.
pub const MIN_QUERY_CHARS: usize = 2;

/// A candidate destination returned by a [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    /// Place or business name.
    pub name: String,
    /// Best available formatted address.
    pub address: String,
    pub location: Coordinate,
}

/// Errors raised by geocoding services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request could not be sent or the connection failed.
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },
    /// The service did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    /// The service answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocoding response: {message}")]
    Parse { message: String },
}

/// Resolve free text into candidate places.
pub trait Geocoder {
    /// Search for `query`. An empty vector means no match.
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;
}

/// Resolve a coordinate into a display address.
pub trait ReverseGeocoder {
    /// Best-effort address for `at`; `Ok(None)` when nothing is known.
    fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        (**self).search(query)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        (**self).search(query)
    }
}

impl<R: ReverseGeocoder + ?Sized> ReverseGeocoder for &R {
    fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        (**self).reverse(at)
    }
}

impl<R: ReverseGeocoder + ?Sized> ReverseGeocoder for Box<R> {
    fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        (**self).reverse(at)
    }
}

/// Which resolver in a [`FallbackGeocoder`] produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Primary,
    Fallback,
}

/// Successful result of [`FallbackGeocoder::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub places: Vec<Place>,
    pub source: SearchSource,
}

/// Errors returned by [`FallbackGeocoder::search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The trimmed query was shorter than [`MIN_QUERY_CHARS`].
    #[error("search query must have at least {} characters", MIN_QUERY_CHARS)]
    QueryTooShort,
    /// Neither resolver produced a result.
    #[error("no results{}", describe_failures(.primary, .fallback))]
    NoResults {
        /// Failure of the primary resolver, if it failed rather than came back empty.
        primary: Option<GeocodeError>,
        /// Failure of the fallback resolver, if it failed rather than came back empty.
        fallback: Option<GeocodeError>,
    },
}

fn describe_failures(primary: &Option<GeocodeError>, fallback: &Option<GeocodeError>) -> String {
    match (primary.as_ref(), fallback.as_ref()) {
        (None, None) => String::new(),
        (Some(p), None) => format!(" (primary: {p})"),
        (None, Some(f)) => format!(" (fallback: {f})"),
        (Some(p), Some(f)) => format!(" (primary: {p}; fallback: {f})"),
    }
}

/// Two geocoders tried in order.
#[derive(Debug, Clone)]
pub struct FallbackGeocoder<P, S> {
    primary: P,
    fallback: S,
}

impl<P, S> FallbackGeocoder<P, S>
where
    P: Geocoder,
    S: Geocoder,
{
    /// Chain `primary` with `fallback`.
    pub const fn new(primary: P, fallback: S) -> Self {
        Self { primary, fallback }
    }

    /// Search the primary resolver, falling back when it is empty or fails.
    pub fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Err(SearchError::QueryTooShort);
        }

        let primary_error = match self.primary.search(trimmed) {
            Ok(places) if !places.is_empty() => {
                return Ok(SearchOutcome {
                    places,
                    source: SearchSource::Primary,
                });
            }
            Ok(_) => None,
            Err(err) => {
                log::warn!("primary geocoder failed for {trimmed:?}: {err}");
                Some(err)
            }
        };

        match self.fallback.search(trimmed) {
            Ok(places) if !places.is_empty() => Ok(SearchOutcome {
                places,
                source: SearchSource::Fallback,
            }),
            Ok(_) => Err(SearchError::NoResults {
                primary: primary_error,
                fallback: None,
            }),
            Err(err) => {
                log::warn!("fallback geocoder failed for {trimmed:?}: {err}");
                Err(SearchError::NoResults {
                    primary: primary_error,
                    fallback: Some(err),
                })
            }
        }
    }
}
