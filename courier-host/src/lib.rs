//! Host-side orchestration for the courier app.
//!
//! [`Host`] owns the stop list, the provisional selection and the courier's
//! position, and drives the map surface through a
//! [`courier_bridge::BridgeSession`]. It is the only writer of stops; the
//! map only ever sees commands derived from them.

pub mod error;
pub mod host;
pub mod status;

pub use error::HostError;
pub use host::Host;
pub use status::{Alert, MapStatus, SelectedPoint};
