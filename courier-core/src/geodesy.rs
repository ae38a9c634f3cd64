//! Great-circle distance and arrival-time projection.
//!
//! Both functions are pure and assume validated input.

use chrono::{NaiveTime, TimeDelta, Timelike};

use crate::Coordinate;

/// Mean Earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average travel pace used by [`eta`].
pub const MINUTES_PER_KM: f64 = 3.0;

/// Haversine distance between two coordinates in kilometres, rounded to one
/// decimal place.
///
/// # Examples
/// ```
/// use courier_core::{Coordinate, distance_km};
///
/// let a = Coordinate::new(0.0, 0.0)?;
/// let b = Coordinate::new(1.0, 0.0)?;
/// assert_eq!(distance_km(a, b), 111.2);
/// assert_eq!(distance_km(a, a), 0.0);
/// # Ok::<(), courier_core::CoordinateError>(())
/// ```
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    round_tenth(EARTH_RADIUS_KM * c)
}

/// Projected arrival time after travelling `cumulative_km` from `start`.
///
/// The travel time is rounded to whole minutes. The result wraps past
/// midnight; no date is tracked.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use courier_core::eta;
///
/// let start = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
/// assert_eq!(eta(start, 5.0), NaiveTime::from_hms_opt(0, 5, 0).unwrap());
/// ```
#[must_use]
pub fn eta(start: NaiveTime, cumulative_km: f64) -> NaiveTime {
    let minutes = (cumulative_km * MINUTES_PER_KM).round() as i64;
    start + TimeDelta::minutes(minutes)
}

/// Render a clock time as `H:MM`, the format shown next to each stop.
#[must_use]
pub fn format_clock(time: NaiveTime) -> String {
    format!("{}:{:02}", time.hour(), time.minute())
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
