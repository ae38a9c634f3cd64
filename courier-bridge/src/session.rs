//! Bridge session state machine.
//!
//! A [`BridgeSession`] owns the only copy of the surface's lifecycle state.
//! It loads candidate SDK URLs in order, buffers commands until the map
//! reports readiness, enforces a one-shot readiness deadline and reports a
//! terminal failure exactly once. Every input is synchronous; outcomes the
//! host must react to are returned as [`BridgeNotice`] values.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use courier_core::Coordinate;
use thiserror::Error;

use crate::codec::{Command, Event};
use crate::surface::Surface;

/// Time the surface has to report readiness after [`BridgeSession::start`].
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(8);

/// Source of the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Lifecycle of one mounted surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet started, or reset by a re-mount.
    Uninitialized,
    /// Loading the SDK from the candidate at index `attempt`.
    Loading {
        /// Index into [`BridgeConfig::resource_urls`].
        attempt: usize,
    },
    /// The map is live and commands are delivered immediately.
    Ready,
    /// Terminal until the next reset.
    Failed(SessionFailure),
}

/// Why a session failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFailure {
    /// Every candidate SDK URL failed to load.
    #[error("map resources failed to load from every source: {}", .attempted.join(", "))]
    ResourcesExhausted {
        /// URLs tried, in order.
        attempted: Vec<String>,
    },
    /// The surface reported an error before becoming ready.
    #[error("map failed to initialise: {message}")]
    Initialization {
        /// Error text from the surface.
        message: String,
    },
    /// The surface never reported readiness.
    #[error(
        "map did not become ready within {}s; check that this app's domain is registered for the map SDK key",
        .after.as_secs()
    )]
    TimedOut {
        /// The deadline that elapsed.
        after: Duration,
    },
    /// No SDK URLs were configured.
    #[error("no map resource URLs configured")]
    NoCandidates,
}

/// Configuration for [`BridgeSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Candidate SDK URLs, tried in order.
    pub resource_urls: Vec<String>,
    /// Readiness deadline measured from [`BridgeSession::start`].
    pub ready_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            resource_urls: Vec::new(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    /// Create a configuration trying `resource_urls` in order.
    #[must_use]
    pub fn new<I, U>(resource_urls: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        Self {
            resource_urls: resource_urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Candidate Kakao Maps SDK URLs for `app_key`.
    ///
    /// # Examples
    /// ```
    /// use courier_bridge::BridgeConfig;
    ///
    /// let config = BridgeConfig::kakao("abc123");
    /// assert_eq!(config.resource_urls.len(), 2);
    /// assert!(config.resource_urls[0].starts_with("https://dapi.kakao.com/"));
    /// ```
    #[must_use]
    pub fn kakao(app_key: &str) -> Self {
        let key = urlencoding::encode(app_key);
        Self::new([
            format!("https://dapi.kakao.com/v2/maps/sdk.js?appkey={key}&autoload=false"),
            format!("http://dapi.kakao.com/v2/maps/sdk.js?appkey={key}&autoload=false"),
        ])
    }

    /// Set the readiness deadline.
    #[must_use]
    pub const fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }
}

/// Outcome of a session input that the host must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeNotice {
    /// The surface became ready and queued commands were delivered.
    Ready,
    /// The session failed. Emitted at most once per session.
    Failed(SessionFailure),
    /// The surface reported an error after becoming ready.
    RuntimeError(String),
    /// The user tapped the map.
    PointTapped(Coordinate),
}

/// Drives one surface from mount to readiness or failure.
///
/// # Examples
/// ```
/// use courier_bridge::test_support::RecordingSurface;
/// use courier_bridge::{BridgeConfig, BridgeNotice, BridgeSession, Command, SessionState};
///
/// let config = BridgeConfig::new(["https://maps.example.com/sdk.js"]);
/// let mut session = BridgeSession::new(config, RecordingSurface::default());
/// assert_eq!(session.start(), None);
///
/// session.dispatch(Command::ClearMarkers);
/// assert_eq!(session.pending_len(), 1);
///
/// assert_eq!(session.receive(r#"{"type":"mapReady"}"#), Some(BridgeNotice::Ready));
/// assert_eq!(session.state(), &SessionState::Ready);
/// assert_eq!(session.surface().scripts().len(), 1);
/// ```
#[derive(Debug)]
pub struct BridgeSession<S, C = SystemClock> {
    config: BridgeConfig,
    surface: S,
    clock: C,
    state: SessionState,
    pending: VecDeque<Command>,
    deadline: Option<Instant>,
    failure_reported: bool,
}

impl<S: Surface> BridgeSession<S> {
    /// Create a session using the system clock.
    #[must_use]
    pub const fn new(config: BridgeConfig, surface: S) -> Self {
        Self::with_clock(config, surface, SystemClock)
    }
}

impl<S: Surface, C: Clock> BridgeSession<S, C> {
    /// Create a session reading time from `clock`.
    #[must_use]
    pub const fn with_clock(config: BridgeConfig, surface: S, clock: C) -> Self {
        Self {
            config,
            surface,
            clock,
            state: SessionState::Uninitialized,
            pending: VecDeque::new(),
            deadline: None,
            failure_reported: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether commands are delivered immediately.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready)
    }

    /// Number of commands waiting for readiness.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The driven surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the driven surface.
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Begin loading the first candidate and arm the readiness deadline.
    ///
    /// Returns a failure notice when no candidates are configured. Calling
    /// `start` outside [`SessionState::Uninitialized`] does nothing.
    pub fn start(&mut self) -> Option<BridgeNotice> {
        if self.state != SessionState::Uninitialized {
            log::debug!("ignoring start in state {:?}", self.state);
            return None;
        }
        let Some(url) = self.config.resource_urls.first().cloned() else {
            return self.fail(SessionFailure::NoCandidates);
        };
        self.deadline = self.clock.now().checked_add(self.config.ready_timeout);
        self.state = SessionState::Loading { attempt: 0 };
        log::info!("loading map resources from {url}");
        self.surface.load(&url);
        None
    }

    /// Record that the current candidate failed to load.
    ///
    /// Moves to the next candidate if there is one, otherwise fails with a
    /// message listing every attempted URL. The readiness deadline keeps
    /// running across attempts and is checked first, so a failure reported
    /// after it elapsed yields [`SessionFailure::TimedOut`].
    ///
    /// Rendered pages report SDK load errors by calling the page-level
    /// function named [`RESOURCE_FAILED_HOOK`](crate::RESOURCE_FAILED_HOOK);
    /// embedders route that call here.
    pub fn resource_failed(&mut self, reason: &str) -> Option<BridgeNotice> {
        if let Some(notice) = self.expire_if_due() {
            return Some(notice);
        }
        let SessionState::Loading { attempt } = self.state else {
            log::debug!("ignoring resource failure in state {:?}: {reason}", self.state);
            return None;
        };
        let failed = self
            .config
            .resource_urls
            .get(attempt)
            .map_or("<unknown>", String::as_str);
        log::warn!("map resources failed to load from {failed}: {reason}");

        let next = attempt + 1;
        if let Some(url) = self.config.resource_urls.get(next).cloned() {
            self.state = SessionState::Loading { attempt: next };
            log::info!("retrying map resources from {url}");
            self.surface.load(&url);
            return None;
        }
        let attempted = self.config.resource_urls.iter().take(next).cloned().collect();
        self.fail(SessionFailure::ResourcesExhausted { attempted })
    }

    /// Feed a raw message from the surface.
    ///
    /// Malformed messages are logged and dropped.
    pub fn receive(&mut self, raw: &str) -> Option<BridgeNotice> {
        match Event::decode(raw) {
            Ok(event) => self.apply(event),
            Err(err) => {
                log::debug!("dropping surface message {raw:?}: {err}");
                None
            }
        }
    }

    /// Apply a decoded surface event.
    ///
    /// An elapsed readiness deadline takes precedence over the event.
    pub fn apply(&mut self, event: Event) -> Option<BridgeNotice> {
        if let Some(notice) = self.expire_if_due() {
            log::debug!("dropping {event:?} after the readiness deadline");
            return Some(notice);
        }
        match event {
            Event::Ready => self.on_ready(),
            Event::MapError { message } => self.on_map_error(message),
            Event::PointTapped(at) => Some(BridgeNotice::PointTapped(at)),
        }
    }

    fn on_ready(&mut self) -> Option<BridgeNotice> {
        if !matches!(self.state, SessionState::Loading { .. }) {
            log::debug!("ignoring ready signal in state {:?}", self.state);
            return None;
        }
        self.state = SessionState::Ready;
        self.deadline = None;
        log::info!("map ready; delivering {} queued commands", self.pending.len());
        while let Some(command) = self.pending.pop_front() {
            self.surface.evaluate(&command.encode());
        }
        Some(BridgeNotice::Ready)
    }

    fn on_map_error(&mut self, message: String) -> Option<BridgeNotice> {
        match self.state {
            SessionState::Ready => {
                log::warn!("map runtime error: {message}");
                Some(BridgeNotice::RuntimeError(message))
            }
            SessionState::Failed(_) => {
                log::debug!("suppressing map error after failure: {message}");
                None
            }
            SessionState::Uninitialized | SessionState::Loading { .. } => {
                self.fail(SessionFailure::Initialization { message })
            }
        }
    }

    /// Fail the session if the readiness deadline has elapsed.
    pub fn poll_timeout(&mut self) -> Option<BridgeNotice> {
        self.expire_if_due()
    }

    fn expire_if_due(&mut self) -> Option<BridgeNotice> {
        let deadline = self.deadline?;
        if self.clock.now() < deadline {
            return None;
        }
        self.deadline = None;
        match self.state {
            SessionState::Uninitialized | SessionState::Loading { .. } => {
                self.fail(SessionFailure::TimedOut {
                    after: self.config.ready_timeout,
                })
            }
            SessionState::Ready | SessionState::Failed(_) => None,
        }
    }

    /// Send a command to the surface, queueing it until readiness.
    ///
    /// Commands dispatched after a failure are dropped. Returns the timeout
    /// failure when the readiness deadline elapsed before this call.
    pub fn dispatch(&mut self, command: Command) -> Option<BridgeNotice> {
        let notice = self.expire_if_due();
        match self.state {
            SessionState::Ready => self.surface.evaluate(&command.encode()),
            SessionState::Uninitialized | SessionState::Loading { .. } => {
                self.pending.push_back(command);
            }
            SessionState::Failed(_) => {
                log::debug!("dropping {} after session failure", command.entry_point());
            }
        }
        notice
    }

    /// Return to [`SessionState::Uninitialized`] for a fresh mount.
    pub fn reset(&mut self) {
        log::debug!("resetting bridge session");
        self.state = SessionState::Uninitialized;
        self.pending.clear();
        self.deadline = None;
        self.failure_reported = false;
    }

    fn fail(&mut self, failure: SessionFailure) -> Option<BridgeNotice> {
        log::warn!("map session failed: {failure}");
        self.state = SessionState::Failed(failure.clone());
        self.pending.clear();
        self.deadline = None;
        if self.failure_reported {
            return None;
        }
        self.failure_reported = true;
        Some(BridgeNotice::Failed(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, RecordingSurface};
    use rstest::{fixture, rstest};

    const PRIMARY: &str = "https://primary.example.com/sdk.js";
    const BACKUP: &str = "https://backup.example.com/sdk.js";

    type TestSession<'a> = BridgeSession<RecordingSurface, &'a ManualClock>;

    #[fixture]
    fn clock() -> ManualClock {
        ManualClock::new()
    }

    fn session(clock: &ManualClock) -> TestSession<'_> {
        BridgeSession::with_clock(
            BridgeConfig::new([PRIMARY, BACKUP]),
            RecordingSurface::default(),
            clock,
        )
    }

    fn move_to(lat: f64) -> Command {
        Command::MoveTo {
            at: Coordinate::new(lat, 0.0).expect("valid coordinate"),
        }
    }

    #[rstest]
    fn start_loads_first_candidate(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.state(), &SessionState::Loading { attempt: 0 });
        assert_eq!(session.surface().loads(), [PRIMARY]);
    }

    #[rstest]
    fn start_without_candidates_fails(clock: ManualClock) {
        let mut session =
            BridgeSession::with_clock(BridgeConfig::default(), RecordingSurface::default(), &clock);
        assert_eq!(
            session.start(),
            Some(BridgeNotice::Failed(SessionFailure::NoCandidates))
        );
    }

    #[rstest]
    fn second_start_is_ignored(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.start(), None);
        assert_eq!(session.surface().loads().len(), 1);
    }

    #[rstest]
    fn queued_commands_flush_in_order_on_ready(clock: ManualClock) {
        let mut session = session(&clock);
        session.dispatch(move_to(1.0));
        assert_eq!(session.start(), None);
        session.dispatch(Command::ClearMarkers);
        session.dispatch(move_to(2.0));
        assert!(session.surface().scripts().is_empty());

        assert_eq!(
            session.receive(r#"{"type":"mapReady"}"#),
            Some(BridgeNotice::Ready)
        );
        let scripts = session.surface().scripts();
        assert_eq!(scripts.len(), 3);
        assert!(scripts[0].contains("moveTo(1, 0)"));
        assert!(scripts[1].contains("clearAllMarkers()"));
        assert!(scripts[2].contains("moveTo(2, 0)"));
        assert_eq!(session.pending_len(), 0);

        // A duplicate ready signal must not replay anything.
        assert_eq!(session.receive(r#"{"type":"mapReady"}"#), None);
        assert_eq!(session.surface().scripts().len(), 3);
    }

    #[rstest]
    fn ready_session_delivers_immediately(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(
            session.receive(r#"{"type":"mapReady"}"#),
            Some(BridgeNotice::Ready)
        );
        session.dispatch(Command::ClearMarkers);
        assert_eq!(session.surface().scripts().len(), 1);
        assert_eq!(session.pending_len(), 0);
    }

    #[rstest]
    fn resource_failure_moves_to_next_candidate(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.resource_failed("404"), None);
        assert_eq!(session.state(), &SessionState::Loading { attempt: 1 });
        assert_eq!(session.surface().loads(), [PRIMARY, BACKUP]);
    }

    #[rstest]
    fn exhausted_candidates_list_every_url(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.resource_failed("404"), None);
        let Some(BridgeNotice::Failed(failure)) = session.resource_failed("blocked") else {
            panic!("expected failure notice");
        };
        let message = failure.to_string();
        assert!(message.contains(PRIMARY), "{message}");
        assert!(message.contains(BACKUP), "{message}");
    }

    #[rstest]
    fn init_error_fails_and_discards_queue(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        session.dispatch(Command::ClearMarkers);
        let notice = session.receive(r#"{"type":"mapError","message":"bad key"}"#);
        assert_eq!(
            notice,
            Some(BridgeNotice::Failed(SessionFailure::Initialization {
                message: String::from("bad key"),
            }))
        );
        assert_eq!(session.pending_len(), 0);
        assert!(session.surface().scripts().is_empty());
    }

    #[rstest]
    fn failure_is_reported_once(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapError","message":"a"}"#).is_some());
        assert_eq!(session.receive(r#"{"type":"mapError","message":"b"}"#), None);
        clock.advance(Duration::from_secs(60));
        assert_eq!(session.poll_timeout(), None);
    }

    #[rstest]
    fn commands_after_failure_are_dropped(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapError"}"#).is_some());
        session.dispatch(Command::ClearMarkers);
        assert_eq!(session.pending_len(), 0);
        assert!(session.surface().scripts().is_empty());
    }

    #[rstest]
    fn runtime_errors_after_ready_keep_state(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapReady"}"#).is_some());
        assert_eq!(
            session.receive(r#"{"type":"mapError","message":"tile 500"}"#),
            Some(BridgeNotice::RuntimeError(String::from("tile 500")))
        );
        assert!(session.is_ready());
    }

    #[rstest]
    fn times_out_when_never_ready(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        clock.advance(Duration::from_millis(7_999));
        assert_eq!(session.poll_timeout(), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(
            session.poll_timeout(),
            Some(BridgeNotice::Failed(SessionFailure::TimedOut {
                after: DEFAULT_READY_TIMEOUT,
            }))
        );
        assert_eq!(session.receive(r#"{"type":"mapReady"}"#), None);
        assert!(!session.is_ready());
    }

    #[rstest]
    fn late_ready_signal_times_out_and_drops_queue(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        session.dispatch(Command::ClearMarkers);
        clock.advance(Duration::from_secs(30));

        assert_eq!(
            session.receive(r#"{"type":"mapReady"}"#),
            Some(BridgeNotice::Failed(SessionFailure::TimedOut {
                after: DEFAULT_READY_TIMEOUT,
            }))
        );
        assert!(!session.is_ready());
        assert_eq!(session.pending_len(), 0);
        assert!(session.surface().scripts().is_empty());
        assert_eq!(session.poll_timeout(), None);
    }

    #[rstest]
    fn late_last_resource_failure_reports_timeout(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.resource_failed("404"), None);
        clock.advance(DEFAULT_READY_TIMEOUT);

        assert_eq!(
            session.resource_failed("blocked"),
            Some(BridgeNotice::Failed(SessionFailure::TimedOut {
                after: DEFAULT_READY_TIMEOUT,
            }))
        );
        assert_eq!(session.surface().loads(), [PRIMARY, BACKUP]);
    }

    #[rstest]
    fn dispatch_after_deadline_reports_timeout(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        clock.advance(Duration::from_secs(9));

        assert!(matches!(
            session.dispatch(Command::ClearMarkers),
            Some(BridgeNotice::Failed(SessionFailure::TimedOut { .. }))
        ));
        assert_eq!(session.pending_len(), 0);
        assert_eq!(session.dispatch(Command::ClearMarkers), None);
    }

    #[rstest]
    fn ready_disarms_the_deadline(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapReady"}"#).is_some());
        clock.advance(Duration::from_secs(30));
        assert_eq!(session.poll_timeout(), None);
        assert!(session.is_ready());
    }

    #[rstest]
    fn timeout_message_carries_configuration_hint() {
        let failure = SessionFailure::TimedOut {
            after: DEFAULT_READY_TIMEOUT,
        };
        assert!(failure.to_string().contains("registered for the map SDK key"));
    }

    #[rstest]
    fn malformed_messages_are_dropped(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert_eq!(session.receive("{oops"), None);
        assert_eq!(session.receive(r#"{"type":"mapZoom"}"#), None);
        assert_eq!(session.state(), &SessionState::Loading { attempt: 0 });
    }

    #[rstest]
    fn taps_are_forwarded(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapReady"}"#).is_some());
        let notice = session.receive(r#"{"type":"mapClick","lat":37.5,"lng":127.0}"#);
        assert_eq!(
            notice,
            Some(BridgeNotice::PointTapped(
                Coordinate::new(37.5, 127.0).expect("valid tap")
            ))
        );
    }

    #[rstest]
    fn reset_allows_a_fresh_mount(clock: ManualClock) {
        let mut session = session(&clock);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapError"}"#).is_some());

        session.reset();
        assert_eq!(session.state(), &SessionState::Uninitialized);
        assert_eq!(session.start(), None);
        assert!(session.receive(r#"{"type":"mapError"}"#).is_some());
    }

    #[rstest]
    fn kakao_candidates_encode_the_key() {
        let config = BridgeConfig::kakao("a b");
        assert!(config.resource_urls.iter().all(|url| url.contains("appkey=a%20b")));
        assert_eq!(config.ready_timeout, DEFAULT_READY_TIMEOUT);
    }
}
