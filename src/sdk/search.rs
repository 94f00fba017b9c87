//! Single-flight trip searches.
//!
//! `SearchController` runs at most one directions request at a time on a
//! tokio task and reports the outcome as a [`SearchEvent`] over a channel.
//! `TripSession` sits on the receiving side; it is the only owner of the
//! current results and replaces them wholesale when an event arrives.

use crate::sdk::form::request::TripRequest;
use crate::sdk::notify::{SoundPlayer, SpeechSink};
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::format::{format_response, TripResults};
use crate::sdk::routing::service::DirectionsProvider;
use crate::sdk::routing::types::RouteResponse;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum SearchEvent {
    Completed(RouteResponse),
    Failed(RoutingError),
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("A search is already in progress")]
    InFlight,
}

// Clears the in-flight flag when the worker finishes, panics included.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SearchController<P> {
    provider: Arc<P>,
    in_flight: Arc<AtomicBool>,
    cancel: Mutex<Option<CancellationToken>>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl<P: DirectionsProvider> SearchController<P> {
    pub fn new(provider: Arc<P>) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            provider,
            in_flight: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(None),
            events,
        };
        (controller, receiver)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a search, or refuses with `SearchError::InFlight` while one is
    /// outstanding. Must be called inside a tokio runtime.
    pub fn submit(&self, request: TripRequest) -> Result<(), SearchError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Search rejected: another search is still running");
            return Err(SearchError::InFlight);
        }
        let guard = FlightGuard(Arc::clone(&self.in_flight));
        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());

        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        log::info!(
            "Searching {} directions from \"{}\" to \"{}\"",
            request.mode.as_str(),
            request.origin,
            request.destination
        );
        tokio::spawn(async move {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => SearchEvent::Cancelled,
                result = provider.directions(&request) => match result {
                    Ok(routes) => SearchEvent::Completed(routes),
                    Err(e) => SearchEvent::Failed(e),
                },
            };
            // Release before reporting so the receiver may resubmit immediately.
            drop(guard);
            if events.send(event).is_err() {
                log::debug!("Search finished after its receiver was dropped");
            }
        });
        Ok(())
    }

    /// Cancels the outstanding search. Returns false when nothing was running.
    pub fn cancel(&self) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        match self.cancel.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// What the front end should show after a `SearchEvent` was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Routes(usize),
    Failed(String),
    Cancelled,
}

/// Owner of the current trip results on the interactive side.
pub struct TripSession {
    results: TripResults,
    selected: usize,
    speech: Arc<dyn SpeechSink>,
    sound: Arc<dyn SoundPlayer>,
    multiple_choice_sound: Option<PathBuf>,
}

impl TripSession {
    pub fn new(
        speech: Arc<dyn SpeechSink>,
        sound: Arc<dyn SoundPlayer>,
        multiple_choice_sound: Option<PathBuf>,
    ) -> Self {
        Self {
            results: TripResults::default(),
            selected: 0,
            speech,
            sound,
            multiple_choice_sound,
        }
    }

    /// Drops the previous results and announces the new search.
    pub fn begin_search(&mut self) {
        self.results = TripResults::default();
        self.selected = 0;
        self.speech.say("Planning Trip.", true);
    }

    pub fn apply(&mut self, event: SearchEvent) -> SessionUpdate {
        match event {
            SearchEvent::Completed(response) => {
                self.results = format_response(&response);
                self.selected = 0;
                let count = self.results.len();
                log::info!("{} alternative route(s) received", count);
                self.speech.say(&self.results.spoken_summary(), false);
                if count > 1 {
                    self.sound.play(self.multiple_choice_sound.as_deref());
                }
                SessionUpdate::Routes(count)
            }
            SearchEvent::Failed(e) => {
                log::error!("Search failed: {}", e);
                SessionUpdate::Failed(e.user_message())
            }
            SearchEvent::Cancelled => {
                log::info!("Search cancelled");
                SessionUpdate::Cancelled
            }
        }
    }

    pub fn results(&self) -> &TripResults {
        &self.results
    }

    /// The route chooser is only offered when there is something to choose.
    pub fn has_alternatives(&self) -> bool {
        self.results.len() > 1
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current_block(&self) -> Option<&str> {
        self.results.block(self.selected)
    }

    pub fn select_route(&mut self, index: usize) -> Option<&str> {
        if index >= self.results.len() {
            return None;
        }
        self.selected = index;
        self.current_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::form::request::TravelMode;
    use crate::sdk::notify::testing::{RecordingSound, RecordingSpeech};
    use crate::sdk::routing::types::{Leg, Route};
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct MockProvider {
        gate: Option<Arc<Notify>>,
        routes: usize,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(routes: usize) -> Self {
            Self {
                gate: None,
                routes,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(routes: usize, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(routes)
            }
        }
    }

    fn route(n: usize) -> Route {
        Route {
            legs: vec![Leg {
                start_address: format!("Start {}", n),
                end_address: "End".to_string(),
                distance: None,
                duration: None,
                departure_time: None,
                arrival_time: None,
                steps: vec![],
            }],
            warnings: vec![],
        }
    }

    impl DirectionsProvider for MockProvider {
        async fn directions(&self, _request: &TripRequest) -> Result<RouteResponse, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(RoutingError::Timeout);
            }
            Ok(RouteResponse::from_routes((1..=self.routes).map(route).collect()))
        }
    }

    fn request() -> TripRequest {
        TripRequest {
            origin: "A".to_string(),
            destination: "B".to_string(),
            mode: TravelMode::Driving,
            waypoints: vec![],
            optimize_waypoints: false,
            avoid: BTreeSet::new(),
            transit: None,
        }
    }

    fn session() -> (TripSession, Arc<RecordingSpeech>, Arc<RecordingSound>) {
        let speech = Arc::new(RecordingSpeech::default());
        let sound = Arc::new(RecordingSound::default());
        let session = TripSession::new(
            speech.clone(),
            sound.clone(),
            Some(PathBuf::from("sounds/multiple_choice.wav")),
        );
        (session, speech, sound)
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(MockProvider::gated(1, gate.clone()));
        let (controller, mut events) = SearchController::new(provider.clone());

        controller.submit(request()).unwrap();
        assert!(controller.is_in_flight());
        assert_eq!(controller.submit(request()), Err(SearchError::InFlight));

        gate.notify_one();
        let event = events.recv().await.unwrap();
        assert!(matches!(event, SearchEvent::Completed(ref r) if r.len() == 1));
        assert!(!controller.is_in_flight());

        // The guard is free again.
        gate.notify_one();
        controller.submit(request()).unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            SearchEvent::Completed(_)
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancel_reports_cancelled() {
        let gate = Arc::new(Notify::new());
        let (controller, mut events) =
            SearchController::new(Arc::new(MockProvider::gated(1, gate)));
        assert!(!controller.cancel());

        controller.submit(request()).unwrap();
        assert!(controller.cancel());
        assert!(matches!(
            events.recv().await.unwrap(),
            SearchEvent::Cancelled
        ));
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn failure_becomes_a_single_notification() {
        let provider = MockProvider {
            fail: true,
            ..MockProvider::new(0)
        };
        let (controller, mut events) = SearchController::new(Arc::new(provider));
        let (mut session, _, _) = session();

        controller.submit(request()).unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(
            session.apply(event),
            SessionUpdate::Failed("The server failed to respond.".to_string())
        );
        assert!(session.results().is_empty());
    }

    #[tokio::test]
    async fn completed_search_replaces_results() {
        let (controller, mut events) = SearchController::new(Arc::new(MockProvider::new(2)));
        let (mut session, speech, sound) = session();

        session.begin_search();
        controller.submit(request()).unwrap();
        let update = session.apply(events.recv().await.unwrap());
        assert_eq!(update, SessionUpdate::Routes(2));
        assert!(session.has_alternatives());
        assert_eq!(session.results().labels, vec!["Route 1", "Route 2"]);
        assert_eq!(session.current_block(), Some("From: Start 1\nTo: End"));
        assert_eq!(session.select_route(1), Some("From: Start 2\nTo: End"));
        assert_eq!(session.select_route(2), None);
        assert_eq!(session.selected(), 1);

        assert_eq!(
            *speech.spoken.lock().unwrap(),
            vec!["Planning Trip.", "2 Routes found."]
        );
        assert_eq!(sound.played.lock().unwrap().len(), 1);

        // A new search starts from a clean slate.
        session.begin_search();
        assert!(session.results().is_empty());
        assert_eq!(session.current_block(), None);
    }

    #[test]
    fn single_route_does_not_play_sound() {
        let (mut session, speech, sound) = session();
        let update = session.apply(SearchEvent::Completed(RouteResponse::from_routes(vec![
            route(1),
        ])));
        assert_eq!(update, SessionUpdate::Routes(1));
        assert!(!session.has_alternatives());
        assert!(sound.played.lock().unwrap().is_empty());
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["1 Route found."]);
    }

    #[test]
    fn zero_routes_leave_nothing_to_show() {
        let (mut session, speech, _) = session();
        let update = session.apply(SearchEvent::Completed(RouteResponse::default()));
        assert_eq!(update, SessionUpdate::Routes(0));
        assert_eq!(session.current_block(), None);
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["0 Routes found."]);
    }
}
