//! Test doubles for the collaborator traits, shared by unit and behaviour
//! tests across the workspace.

use std::cell::RefCell;

use crate::{
    Coordinate, GeocodeError, Geocoder, LaunchError, Place, ReverseGeocoder, Stop, StopId,
    UrlLauncher,
};

/// Build a stop at `(lat, lng)`, panicking on invalid test input.
///
/// # Panics
/// Panics when the coordinate is out of range.
#[must_use]
pub fn stop(id: u64, lat: f64, lng: f64) -> Stop {
    let Ok(location) = Coordinate::new(lat, lng) else {
        panic!("invalid test coordinate ({lat}, {lng})");
    };
    Stop::new(StopId(id), format!("stop {id}"), location)
}

/// A place called `name` at a fixed central Seoul location.
#[must_use]
pub fn sample_place(name: &str) -> Place {
    Place {
        name: name.to_owned(),
        address: format!("{name}, Jung-gu, Seoul"),
        location: stop(0, 37.5665, 126.978).location,
    }
}

#[derive(Debug, Clone)]
enum StubAnswer {
    Places(Vec<Place>),
    Error(GeocodeError),
}

/// Stub [`Geocoder`] returning a fixed answer and recording queries.
#[derive(Debug, Clone)]
pub struct StubGeocoder {
    answer: StubAnswer,
    queries: RefCell<Vec<String>>,
}

impl StubGeocoder {
    /// A geocoder returning `places` for every query.
    #[must_use]
    pub fn with_places(places: Vec<Place>) -> Self {
        Self {
            answer: StubAnswer::Places(places),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// A geocoder that never finds anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_places(Vec::new())
    }

    /// A geocoder failing with `error` for every query.
    #[must_use]
    pub fn with_error(error: GeocodeError) -> Self {
        Self {
            answer: StubAnswer::Error(error),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl Geocoder for StubGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        self.queries.borrow_mut().push(query.to_owned());
        match &self.answer {
            StubAnswer::Places(places) => Ok(places.clone()),
            StubAnswer::Error(err) => Err(err.clone()),
        }
    }
}

/// Stub [`ReverseGeocoder`] with a fixed answer.
#[derive(Debug, Clone)]
pub struct StubReverseGeocoder {
    answer: Result<Option<String>, GeocodeError>,
    lookups: RefCell<Vec<Coordinate>>,
}

impl StubReverseGeocoder {
    /// Resolve every coordinate to `address`.
    #[must_use]
    pub fn with_address(address: &str) -> Self {
        Self {
            answer: Ok(Some(address.to_owned())),
            lookups: RefCell::new(Vec::new()),
        }
    }

    /// Resolve nothing.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            answer: Ok(None),
            lookups: RefCell::new(Vec::new()),
        }
    }

    /// Fail every lookup with a network error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            answer: Err(GeocodeError::Network {
                url: "https://reverse.example.com".to_owned(),
                message: "connection reset".to_owned(),
            }),
            lookups: RefCell::new(Vec::new()),
        }
    }

    /// Coordinates looked up so far.
    #[must_use]
    pub fn lookups(&self) -> Vec<Coordinate> {
        self.lookups.borrow().clone()
    }
}

impl ReverseGeocoder for StubReverseGeocoder {
    fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        self.lookups.borrow_mut().push(at);
        self.answer.clone()
    }
}

/// [`UrlLauncher`] that records attempts and accepts URLs by prefix.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    accept_prefix: Option<String>,
    attempts: RefCell<Vec<String>>,
}

impl RecordingLauncher {
    /// Accept any URL starting with `prefix`.
    #[must_use]
    pub fn accepting_prefix(prefix: &str) -> Self {
        Self {
            accept_prefix: Some(prefix.to_owned()),
            attempts: RefCell::new(Vec::new()),
        }
    }

    /// Reject every URL.
    #[must_use]
    pub fn rejecting_all() -> Self {
        Self::default()
    }

    /// URLs attempted so far, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl UrlLauncher for RecordingLauncher {
    fn open(&self, url: &str) -> Result<(), LaunchError> {
        self.attempts.borrow_mut().push(url.to_owned());
        match &self.accept_prefix {
            Some(prefix) if url.starts_with(prefix.as_str()) => Ok(()),
            _ => Err(LaunchError {
                url: url.to_owned(),
                reason: "no handler installed".to_owned(),
            }),
        }
    }
}
