//! Delivery stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Opaque identifier of a [`Stop`].
///
/// Identifiers are allocated by whoever owns the stop list and are never
/// reused within that list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A confirmed delivery destination.
///
/// # Examples
/// ```
/// use courier_core::{Coordinate, Stop, StopId};
///
/// let location = Coordinate::new(37.5, 127.0)?;
/// let stop = Stop::new(StopId(1), "Gangnam-daero 1", location);
/// assert_eq!(stop.address, "Gangnam-daero 1");
/// # Ok::<(), courier_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    /// Display text shown to the courier.
    pub address: String,
    pub location: Coordinate,
}

impl Stop {
    /// Construct a stop.
    pub fn new(id: StopId, address: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id,
            address: address.into(),
            location,
        }
    }
}
