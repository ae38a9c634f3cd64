//! The orchestrator tying stops, selection and the map bridge together.

use chrono::NaiveTime;
use courier_bridge::{
    BridgeConfig, BridgeNotice, BridgeSession, Clock, Command, SessionState, Surface,
    SystemClock,
};
use courier_core::{
    Coordinate, Itinerary, NearestNeighbourSequencer, Place, Platform, ReverseGeocoder,
    Sequencer, Stop, StopId, UrlLauncher, launch_first, navigation_candidates,
};

use crate::error::HostError;
use crate::status::{Alert, MapStatus, SelectedPoint, coordinate_text};

/// Owns the courier's stop list and keeps the map in step with it.
///
/// Every change to the ordered stops re-issues the full marker set, so the
/// labels on the map always equal each stop's 1-based position. Commands
/// sent before the map is ready are queued by the bridge session and
/// replayed in order.
#[derive(Debug)]
pub struct Host<S, R, C = SystemClock, Q = NearestNeighbourSequencer> {
    session: BridgeSession<S, C>,
    reverse: R,
    sequencer: Q,
    stops: Vec<Stop>,
    selected: Option<SelectedPoint>,
    origin: Option<Coordinate>,
    next_id: u64,
    status: MapStatus,
    alerts: Vec<Alert>,
}

impl<S: Surface, R: ReverseGeocoder> Host<S, R> {
    /// Create a host with the system clock and nearest-neighbour sequencing.
    #[must_use]
    pub const fn new(config: BridgeConfig, surface: S, reverse: R) -> Self {
        Self::with_parts(
            BridgeSession::new(config, surface),
            reverse,
            NearestNeighbourSequencer,
        )
    }
}

impl<S, R, C, Q> Host<S, R, C, Q>
where
    S: Surface,
    R: ReverseGeocoder,
    C: Clock,
    Q: Sequencer,
{
    /// Assemble a host from an existing session and collaborators.
    #[must_use]
    pub const fn with_parts(session: BridgeSession<S, C>, reverse: R, sequencer: Q) -> Self {
        Self {
            session,
            reverse,
            sequencer,
            stops: Vec::new(),
            selected: None,
            origin: None,
            next_id: 1,
            status: MapStatus::Unmounted,
            alerts: Vec::new(),
        }
    }

    /// Stops in visiting order.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// The provisional selection, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&SelectedPoint> {
        self.selected.as_ref()
    }

    /// The courier's last known position.
    #[must_use]
    pub const fn origin(&self) -> Option<Coordinate> {
        self.origin
    }

    /// Current map availability.
    #[must_use]
    pub const fn map_status(&self) -> &MapStatus {
        &self.status
    }

    /// The underlying bridge session.
    #[must_use]
    pub const fn session(&self) -> &BridgeSession<S, C> {
        &self.session
    }

    /// Take the alerts raised since the last call.
    pub fn drain_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    /// Mount the surface: start the session and queue the current view.
    ///
    /// Does nothing unless the session is uninitialised; use
    /// [`Host::remount`] to restart a live or failed session.
    pub fn mount(&mut self) {
        if self.session.state() != &SessionState::Uninitialized {
            log::debug!("ignoring mount in state {:?}", self.session.state());
            return;
        }
        self.status = MapStatus::Loading;
        let notice = self.session.start();
        self.apply(notice);
        if let Some(origin) = self.origin {
            self.send(Command::MoveTo { at: origin });
        }
        if !self.stops.is_empty() {
            self.render_markers();
        }
    }

    /// Re-mount after the surface was torn down and recreated.
    ///
    /// The session restarts from scratch and the marker set is replayed.
    pub fn remount(&mut self) {
        self.session.reset();
        self.mount();
    }

    /// Feed a raw message posted by the surface.
    pub fn receive(&mut self, raw: &str) {
        let notice = self.session.receive(raw);
        self.apply(notice);
    }

    /// Report that the current SDK candidate failed to load.
    pub fn resource_failed(&mut self, reason: &str) {
        let notice = self.session.resource_failed(reason);
        self.apply(notice);
    }

    /// Check the readiness deadline.
    ///
    /// Every other session input checks it too; polling bounds how late a
    /// silent surface is reported.
    pub fn tick(&mut self) {
        let notice = self.session.poll_timeout();
        self.apply(notice);
    }

    /// Record the courier's position and centre the map on it.
    pub fn set_origin(&mut self, origin: Coordinate) {
        self.origin = Some(origin);
        self.send(Command::MoveTo { at: origin });
    }

    /// Select `at` provisionally and try to resolve its address.
    ///
    /// Reverse-geocoding failures leave the address empty.
    pub fn select(&mut self, at: Coordinate) {
        self.selected = Some(SelectedPoint {
            location: at,
            address: None,
        });
        match self.reverse.reverse(at) {
            Ok(address) => {
                if let Some(selected) = self.selected.as_mut() {
                    selected.address = address;
                }
            }
            Err(err) => log::warn!("reverse geocoding failed for {}: {err}", coordinate_text(at)),
        }
    }

    /// Turn the selection into a stop appended at the end of the route.
    ///
    /// The stop's address is `label_override` when non-blank, else the
    /// resolved address, else the coordinate to five decimals.
    ///
    /// # Errors
    /// Returns [`HostError::NothingSelected`] when there is no selection.
    pub fn confirm_selection(&mut self, label_override: Option<&str>) -> Result<StopId, HostError> {
        let selected = self.selected.take().ok_or(HostError::NothingSelected)?;
        let address = label_override
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map_or_else(|| selected.display_text(), str::to_owned);
        Ok(self.append(address, selected.location))
    }

    /// Drop the selection.
    pub fn cancel_selection(&mut self) {
        self.selected = None;
    }

    /// Append a search result as a stop and move the map to it.
    pub fn add_place(&mut self, place: &Place) -> StopId {
        self.selected = None;
        let id = self.append(place.address.clone(), place.location);
        self.send(Command::MoveTo { at: place.location });
        id
    }

    /// Select a search result provisionally and move the map to it.
    pub fn focus_place(&mut self, place: &Place) {
        self.selected = Some(SelectedPoint {
            location: place.location,
            address: Some(place.address.clone()),
        });
        self.send(Command::MoveTo { at: place.location });
    }

    /// Remove a stop and renumber the remaining markers.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownStop`] when `id` is not in the list.
    pub fn remove_stop(&mut self, id: StopId) -> Result<Stop, HostError> {
        let index = self
            .stops
            .iter()
            .position(|stop| stop.id == id)
            .ok_or(HostError::UnknownStop(id))?;
        let removed = self.stops.remove(index);
        self.render_markers();
        Ok(removed)
    }

    /// Reorder the stops nearest-first from the current origin.
    ///
    /// An empty stop list is left untouched.
    ///
    /// # Errors
    /// Returns [`HostError::OriginUnknown`] when no origin has been set.
    pub fn optimize(&mut self) -> Result<(), HostError> {
        let origin = self.origin.ok_or(HostError::OriginUnknown)?;
        if self.stops.is_empty() {
            return Ok(());
        }
        self.stops = self.sequencer.sequence(origin, &self.stops);
        log::info!("sequenced {} stops", self.stops.len());
        self.render_markers();
        Ok(())
    }

    /// Draw the route through the origin, when known, and every stop.
    pub fn show_route(&mut self) {
        let points = self
            .origin
            .into_iter()
            .chain(self.stops.iter().map(|stop| stop.location))
            .collect();
        self.send(Command::DrawRoute { points });
    }

    /// Distances and arrival times for the current order.
    #[must_use]
    pub fn itinerary(&self, start: NaiveTime) -> Itinerary {
        Itinerary::plan(self.origin, &self.stops, start)
    }

    /// Hand the stop to the navigation app.
    ///
    /// Returns the URL that opened, or `None` when every candidate failed.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownStop`] when `id` is not in the list.
    pub fn navigate<L>(
        &self,
        id: StopId,
        platform: Platform,
        launcher: &L,
    ) -> Result<Option<String>, HostError>
    where
        L: UrlLauncher + ?Sized,
    {
        let stop = self
            .stops
            .iter()
            .find(|stop| stop.id == id)
            .ok_or(HostError::UnknownStop(id))?;
        let candidates = navigation_candidates(stop, platform);
        Ok(launch_first(launcher, &candidates).map(str::to_owned))
    }

    fn append(&mut self, address: String, location: Coordinate) -> StopId {
        let id = StopId(self.next_id);
        self.next_id += 1;
        self.stops.push(Stop::new(id, address, location));
        let label = self.stops.len().to_string();
        self.send(Command::AddMarker { at: location, label });
        id
    }

    fn render_markers(&mut self) {
        let markers: Vec<Command> = self
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| Command::AddMarker {
                at: stop.location,
                label: (index + 1).to_string(),
            })
            .collect();
        self.send(Command::ClearMarkers);
        for marker in markers {
            self.send(marker);
        }
    }

    fn send(&mut self, command: Command) {
        let notice = self.session.dispatch(command);
        self.apply(notice);
    }

    fn apply(&mut self, notice: Option<BridgeNotice>) {
        match notice {
            None => {}
            Some(BridgeNotice::Ready) => self.status = MapStatus::Ready,
            Some(BridgeNotice::Failed(failure)) => {
                let message = failure.to_string();
                self.status = MapStatus::Degraded {
                    reason: message.clone(),
                };
                self.alerts.push(Alert::MapUnavailable { message });
            }
            Some(BridgeNotice::RuntimeError(message)) => {
                log::warn!("map reported an error: {message}");
            }
            Some(BridgeNotice::PointTapped(at)) => self.select(at),
        }
    }
}
