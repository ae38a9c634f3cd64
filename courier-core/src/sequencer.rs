//! Stop ordering.
//!
//! A [`Sequencer`] receives the current stop list and an origin and returns
//! a permutation of the same stops. Implementations never add, drop or edit
//! stops.

use geo::Coord;

use crate::{Coordinate, Stop};

/// Reorder stops for visiting from `origin`.
pub trait Sequencer {
    /// Return `stops` in visiting order.
    fn sequence(&self, origin: Coordinate, stops: &[Stop]) -> Vec<Stop>;
}

/// Greedy nearest-neighbour ordering.
///
/// Starting at the origin, the closest remaining stop is visited next and
/// becomes the new cursor. Closeness is the planar distance in degrees, not
/// the haversine distance used for display. Ties go to the stop that appears
/// first in the input. Runs in `O(n^2)`, which is fine for a courier's stop
/// count.
///
/// # Examples
/// ```
/// use courier_core::{Coordinate, NearestNeighbourSequencer, Sequencer, Stop, StopId};
///
/// # fn main() -> Result<(), courier_core::CoordinateError> {
/// let far = Stop::new(StopId(1), "far", Coordinate::new(5.0, 5.0)?);
/// let near = Stop::new(StopId(2), "near", Coordinate::new(1.0, 0.0)?);
/// let origin = Coordinate::new(0.0, 0.0)?;
///
/// let ordered = NearestNeighbourSequencer.sequence(origin, &[far, near]);
/// assert_eq!(ordered[0].id, StopId(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestNeighbourSequencer;

impl Sequencer for NearestNeighbourSequencer {
    fn sequence(&self, origin: Coordinate, stops: &[Stop]) -> Vec<Stop> {
        let mut remaining = stops.to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut cursor = Coord::from(origin);

        while !remaining.is_empty() {
            let next = closest_index(cursor, &remaining);
            let stop = remaining.remove(next);
            cursor = Coord::from(stop.location);
            ordered.push(stop);
        }
        ordered
    }
}

fn closest_index(cursor: Coord<f64>, candidates: &[Stop]) -> usize {
    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;
    for (index, stop) in candidates.iter().enumerate() {
        let distance = planar_distance(cursor, Coord::from(stop.location));
        // Strict comparison keeps the earliest candidate on ties.
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }
    best_index
}

fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let delta = b - a;
    delta.x.hypot(delta.y)
}
