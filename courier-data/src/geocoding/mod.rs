//! HTTP geocoders for the Kakao Local API and Nominatim.
//!
//! Both geocoders implement the synchronous core traits by blocking on
//! async `reqwest` calls internally, so they can be used from plain
//! synchronous code or from inside a multi-threaded Tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::FallbackGeocoder;
//! use courier_data::geocoding::{KakaoLocalGeocoder, NominatimGeocoder};
//!
//! let kakao = KakaoLocalGeocoder::new("rest-api-key")?;
//! let nominatim = NominatimGeocoder::new()?;
//! let search = FallbackGeocoder::new(kakao, nominatim);
//!
//! let outcome = search.search("Seoul City Hall")?;
//! println!("{} places from {:?}", outcome.places.len(), outcome.source);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod kakao;
mod nominatim;
mod provider;

pub use provider::{
    DEFAULT_PAGE_SIZE, DEFAULT_USER_AGENT, KAKAO_LOCAL_BASE_URL, KakaoLocalConfig,
    KakaoLocalGeocoder, NOMINATIM_BASE_URL, NominatimConfig, NominatimGeocoder,
    ProviderBuildError,
};
