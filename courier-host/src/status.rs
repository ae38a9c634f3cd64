//! What the host shows about the map and the provisional selection.

use courier_core::Coordinate;
use serde::Serialize;

/// Provisional destination picked on the map or from a search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPoint {
    /// Exact tapped or focused location.
    pub location: Coordinate,
    /// Resolved address, when known.
    pub address: Option<String>,
}

impl SelectedPoint {
    /// Text shown for the selection: the address, or the coordinate to five
    /// decimals.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| coordinate_text(self.location))
    }
}

pub(crate) fn coordinate_text(at: Coordinate) -> String {
    format!("{:.5}, {:.5}", at.lat(), at.lng())
}

/// Map availability as presented to the courier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MapStatus {
    /// No surface mounted.
    #[default]
    Unmounted,
    /// Waiting for the surface to become ready.
    Loading,
    /// The map is interactive.
    Ready,
    /// The map failed; list features keep working.
    Degraded {
        /// Failure shown next to the map placeholder.
        reason: String,
    },
}

/// User-facing notification raised by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// The map could not be loaded for this session.
    MapUnavailable {
        /// Failure description including any configuration hint.
        message: String,
    },
}
