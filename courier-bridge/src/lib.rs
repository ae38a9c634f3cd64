//! Host side of the map bridge.
//!
//! The map runs inside an isolated surface (typically a webview) that can
//! only be reached by message passing. This crate defines the command and
//! event wire format, the session state machine that loads the map SDK and
//! gates delivery on readiness, and the bootstrap page served to the
//! surface.

pub mod codec;
pub mod session;
pub mod surface;

#[doc(hidden)]
pub mod test_support;

pub use codec::{Command, DecodeError, Event, READY_FLAG, RESOURCE_FAILED_HOOK};
pub use session::{
    BridgeConfig, BridgeNotice, BridgeSession, Clock, DEFAULT_READY_TIMEOUT, SessionFailure,
    SessionState, SystemClock,
};
pub use surface::{InitialMarker, Surface, SurfacePage};
