//! Wire format between the host and the rendering surface.
//!
//! Outbound traffic is a small set of [`Command`]s, each encoded as a
//! self-executing script that calls one of the surface's global entry
//! points. Inbound traffic is a JSON envelope decoded into an [`Event`].

use courier_core::{Coordinate, CoordinateError};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Global flag the surface sets once its map and entry points exist.
pub const READY_FLAG: &str = "__courierSurfaceReady";

/// Global function the bootstrap page calls with the SDK URL when the SDK
/// script fails to load.
///
/// The embedder defines it, typically through the webview's injected
/// script, and forwards each call to
/// [`BridgeSession::resource_failed`](crate::BridgeSession::resource_failed).
pub const RESOURCE_FAILED_HOOK: &str = "__courierResourceFailed";

/// Message used when a `mapError` event carries no message.
pub const UNKNOWN_MAP_ERROR: &str = "unknown map error";

/// Instruction sent from the host to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Centre the map on a coordinate.
    MoveTo {
        /// New map centre.
        at: Coordinate,
    },
    /// Draw a numbered marker.
    AddMarker {
        /// Marker position.
        at: Coordinate,
        /// Text shown inside the marker, usually the 1-based stop position.
        label: String,
    },
    /// Remove every marker from the map.
    ClearMarkers,
    /// Replace the route polyline.
    DrawRoute {
        /// Polyline vertices in visiting order.
        points: Vec<Coordinate>,
    },
}

impl Command {
    /// Name of the global function this command calls on the surface.
    #[must_use]
    pub const fn entry_point(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "moveTo",
            Self::AddMarker { .. } => "addNumberedMarker",
            Self::ClearMarkers => "clearAllMarkers",
            Self::DrawRoute { .. } => "drawPolyline",
        }
    }

    /// Encode as an injectable script.
    ///
    /// The script is a no-op unless the surface has raised [`READY_FLAG`]
    /// and defines the entry point. It ends in `true;` so webview
    /// injection APIs receive a serialisable completion value.
    ///
    /// # Examples
    /// ```
    /// use courier_bridge::Command;
    ///
    /// let script = Command::ClearMarkers.encode();
    /// assert!(script.contains("clearAllMarkers()"));
    /// assert!(script.ends_with("true;"));
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        let call = match self {
            Self::MoveTo { at } => format!("moveTo({}, {})", at.lat(), at.lng()),
            Self::AddMarker { at, label } => format!(
                "addNumberedMarker({}, {}, {})",
                at.lat(),
                at.lng(),
                Value::from(label.as_str())
            ),
            Self::ClearMarkers => String::from("clearAllMarkers()"),
            Self::DrawRoute { points } => {
                let path: Vec<Value> = points
                    .iter()
                    .map(|p| json!({ "lat": p.lat(), "lng": p.lng() }))
                    .collect();
                format!("drawPolyline({})", Value::Array(path))
            }
        };
        format!(
            "(function () {{ if (!window.{READY_FLAG} || typeof {name} !== 'function') {{ return; }} {call}; }})(); true;",
            name = self.entry_point(),
        )
    }
}

/// Message received from the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The map finished initialising.
    Ready,
    /// The surface reported an error.
    MapError {
        /// Error text reported by the surface.
        message: String,
    },
    /// The user tapped the map.
    PointTapped(Coordinate),
}

/// Errors raised by [`Event::decode`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The payload was not a JSON object of the expected shape.
    #[error("malformed surface message: {0}")]
    Malformed(String),
    /// The envelope had no `type` field.
    #[error("surface message has no type")]
    MissingType,
    /// The `type` field named an unknown event.
    #[error("unknown surface message type {0:?}")]
    UnknownType(String),
    /// A field required by the event type was absent.
    #[error("{kind} message is missing `{field}`")]
    MissingField {
        /// Event type being decoded.
        kind: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A tap arrived with an out-of-range coordinate.
    #[error("tap coordinate rejected: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    message: Option<Value>,
}

impl Event {
    /// Decode a raw surface message.
    ///
    /// # Errors
    /// Returns [`DecodeError`] for malformed JSON, unknown or missing types,
    /// missing tap coordinates and out-of-range taps.
    ///
    /// # Examples
    /// ```
    /// use courier_bridge::Event;
    ///
    /// assert_eq!(Event::decode(r#"{"type":"mapReady"}"#), Ok(Event::Ready));
    /// assert!(Event::decode("not json").is_err());
    /// ```
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope =
            serde_json::from_str(raw).map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let kind = envelope.kind.ok_or(DecodeError::MissingType)?;
        match kind.as_str() {
            "mapReady" => Ok(Self::Ready),
            "mapError" => Ok(Self::MapError {
                message: envelope
                    .message
                    .map_or_else(|| String::from(UNKNOWN_MAP_ERROR), describe_message),
            }),
            "mapClick" => {
                let lat = envelope.lat.ok_or(DecodeError::MissingField {
                    kind: "mapClick",
                    field: "lat",
                })?;
                let lng = envelope.lng.ok_or(DecodeError::MissingField {
                    kind: "mapClick",
                    field: "lng",
                })?;
                Ok(Self::PointTapped(Coordinate::new(lat, lng)?))
            }
            _ => Err(DecodeError::UnknownType(kind)),
        }
    }
}

fn describe_message(message: Value) -> String {
    match message {
        Value::String(text) => text,
        Value::Null => String::from(UNKNOWN_MAP_ERROR),
        other => other.to_string(),
    }
}
