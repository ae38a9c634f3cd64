//! Facade crate for the courier route engine.
//!
//! This crate re-exports the domain types, the map bridge and the host
//! orchestrator, and exposes the HTTP geocoders behind the `geocoding-http`
//! feature flag.

#![forbid(unsafe_code)]

pub use courier_core::{
    Coordinate, CoordinateError, FallbackGeocoder, GeocodeError, Geocoder, Itinerary, Leg,
    LaunchError, NearestNeighbourSequencer, Place, Platform, ReverseGeocoder, SearchError,
    SearchOutcome, SearchSource, Sequencer, Stop, StopId, UrlLauncher, distance_km, eta,
    launch_first, navigation_candidates,
};

pub use courier_bridge::{
    BridgeConfig, BridgeNotice, BridgeSession, Clock, Command, DecodeError, Event,
    RESOURCE_FAILED_HOOK, SessionFailure, SessionState, Surface, SurfacePage, SystemClock,
};

pub use courier_host::{Alert, Host, HostError, MapStatus, SelectedPoint};

#[cfg(feature = "geocoding-http")]
pub use courier_data::geocoding::{
    KakaoLocalConfig, KakaoLocalGeocoder, NominatimConfig, NominatimGeocoder, ProviderBuildError,
};
