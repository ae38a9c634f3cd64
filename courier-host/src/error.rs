//! Errors returned by host operations.

use courier_core::StopId;
use thiserror::Error;

/// Errors raised by [`crate::Host`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    /// A confirmation was requested with no selected point.
    #[error("no point is selected; tap the map first")]
    NothingSelected,
    /// The stop does not exist.
    #[error("stop {0} does not exist")]
    UnknownStop(StopId),
    /// Sequencing needs the courier's position.
    #[error("current position is unknown; cannot optimise the route")]
    OriginUnknown,
}
