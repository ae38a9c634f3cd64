//! Leg-by-leg distance and arrival accounting for an ordered stop list.

use chrono::NaiveTime;
use serde::Serialize;

use crate::geodesy::round_tenth;
use crate::{Coordinate, Stop, distance_km, eta};

/// One stop in an [`Itinerary`] with its distance and projected arrival.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    /// 1-based position, matching the marker label on the map.
    pub position: usize,
    pub stop: Stop,
    /// Distance from the previous point in kilometres.
    pub leg_km: f64,
    /// Distance from the origin in kilometres.
    pub cumulative_km: f64,
    /// Projected arrival time.
    pub eta: NaiveTime,
}

/// Distances and arrival times for stops visited in the given order.
///
/// The first leg starts at the origin. When the origin is unknown the first
/// leg starts at the first stop itself and therefore has zero length.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use courier_core::{Coordinate, Itinerary, Stop, StopId};
///
/// # fn main() -> Result<(), courier_core::CoordinateError> {
/// let stops = vec![Stop::new(StopId(1), "depot", Coordinate::new(0.1, 0.0)?)];
/// let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let itinerary = Itinerary::plan(Some(Coordinate::new(0.0, 0.0)?), &stops, start);
///
/// assert_eq!(itinerary.total_km(), 11.1);
/// assert_eq!(itinerary.legs[0].eta, NaiveTime::from_hms_opt(9, 33, 0).unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
}

impl Itinerary {
    /// Compute legs for `stops` in their current order.
    #[must_use]
    pub fn plan(origin: Option<Coordinate>, stops: &[Stop], start: NaiveTime) -> Self {
        let mut previous = origin;
        let mut cumulative_km = 0.0;
        let legs = stops
            .iter()
            .enumerate()
            .map(|(index, stop)| {
                let from = previous.unwrap_or(stop.location);
                let leg_km = distance_km(from, stop.location);
                cumulative_km = round_tenth(cumulative_km + leg_km);
                previous = Some(stop.location);
                Leg {
                    position: index + 1,
                    stop: stop.clone(),
                    leg_km,
                    cumulative_km,
                    eta: eta(start, cumulative_km),
                }
            })
            .collect();
        Self { legs }
    }

    /// Total distance of the itinerary in kilometres.
    #[must_use]
    pub fn total_km(&self) -> f64 {
        self.legs.last().map_or(0.0, |leg| leg.cumulative_km)
    }
}
