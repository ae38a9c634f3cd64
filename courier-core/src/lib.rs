//! Core domain types for the courier routing engine.
//!
//! This crate holds everything that does not touch the rendering surface:
//! validated coordinates, delivery stops, great-circle distance and ETA
//! projection, the greedy stop sequencer, itinerary accounting, the
//! geocoding collaborator traits and the navigation handoff chain.
//!
//! Distances shown to the courier use the haversine formula while the
//! sequencer orders stops by planar distance in degrees. The two are kept
//! separate; unifying them changes route order.

pub mod coordinate;
pub mod geocoding;
pub mod geodesy;
pub mod handoff;
pub mod itinerary;
pub mod sequencer;
pub mod stop;

#[doc(hidden)]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use geocoding::{
    FallbackGeocoder, GeocodeError, Geocoder, MIN_QUERY_CHARS, Place, ReverseGeocoder,
    SearchError, SearchOutcome, SearchSource,
};
pub use geodesy::{EARTH_RADIUS_KM, MINUTES_PER_KM, distance_km, eta, format_clock};
pub use handoff::{
    LaunchError, ParsePlatformError, Platform, UrlLauncher, launch_first, navigation_candidates,
};
pub use itinerary::{Itinerary, Leg};
pub use sequencer::{NearestNeighbourSequencer, Sequencer};
pub use stop::{Stop, StopId};
