//! Debounced, cancellable report fetching.
//!
//! Every parameter change goes through [`FetchCoordinator::request`]. The
//! coordinator keeps a single active fetch: issuing a new request cancels the
//! previous one (whether it is still debouncing or already in flight), so the
//! displayed report always belongs to the latest parameters.

use std::sync::Arc;
use std::time::Duration;

use bo_core::events::events::{FetchFailed, FetchStarted, ReportLoaded};
use bo_core::events::EventBus;
use bo_core::CampaignReport;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::request::ReportRequest;
use crate::sources::CampaignSource;
use crate::DataError;

/// Lifecycle of the current fetch cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    /// Waiting for the parameters to settle
    Debouncing,
    InFlight,
    Succeeded,
    /// Holds the user-facing message
    Failed(String),
}

impl FetchPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, FetchPhase::Debouncing | FetchPhase::InFlight)
    }
}

/// Snapshot published to subscribers
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub phase: FetchPhase,
    /// Last successfully loaded report; kept while a newer one loads
    pub report: Option<CampaignReport>,
    /// Parameters of the most recent request, used by retry
    pub last_request: Option<ReportRequest>,
    /// Identifies the cycle that owns this state
    pub generation: u64,
}

struct ActiveFetch {
    generation: u64,
    token: CancellationToken,
}

struct Shared {
    source: Arc<dyn CampaignSource>,
    events: Arc<EventBus>,
    state: watch::Sender<FetchState>,
}

impl Shared {
    /// Apply `update` only while `generation` still owns the state
    fn transition(&self, generation: u64, update: impl FnOnce(&mut FetchState)) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            update(state);
            true
        })
    }

    async fn run(
        self: Arc<Self>,
        generation: u64,
        token: CancellationToken,
        request: ReportRequest,
        delay: Duration,
    ) {
        if !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if !self.transition(generation, |s| s.phase = FetchPhase::InFlight) {
            return;
        }
        tracing::debug!(
            profile = %request.profile_id,
            start = %request.start_date,
            end = %request.end_date,
            server_filters = request.filters.len(),
            "fetching report"
        );
        self.events.publish(FetchStarted {
            profile_id: request.profile_id.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
        });

        let result = tokio::select! {
            _ = token.cancelled() => Err(DataError::Aborted),
            result = self.source.fetch(&request, token.clone()) => result,
        };

        match result {
            Ok(report) => {
                let campaign_count = report.campaigns.len();
                let applied = self.transition(generation, |s| {
                    s.phase = FetchPhase::Succeeded;
                    s.report = Some(report);
                });
                if applied {
                    tracing::info!(
                        profile = %request.profile_id,
                        campaigns = campaign_count,
                        "report loaded"
                    );
                    self.events.publish(ReportLoaded {
                        profile_id: request.profile_id.clone(),
                        campaign_count,
                    });
                }
            }
            Err(error) if error.is_aborted() => {
                tracing::debug!(generation, "fetch aborted");
                self.transition(generation, |s| s.phase = FetchPhase::Idle);
            }
            Err(error) => {
                let message = error.to_string();
                let applied = self.transition(generation, |s| {
                    s.phase = FetchPhase::Failed(message.clone());
                });
                if applied {
                    tracing::warn!(
                        profile = %request.profile_id,
                        error = %message,
                        "report fetch failed"
                    );
                    self.events.publish(FetchFailed {
                        profile_id: request.profile_id.clone(),
                        message,
                    });
                }
            }
        }
    }
}

/// Owns the single in-flight report request
pub struct FetchCoordinator {
    shared: Arc<Shared>,
    debounce: Duration,
    active: Mutex<Option<ActiveFetch>>,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn CampaignSource>, debounce: Duration, events: Arc<EventBus>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            shared: Arc::new(Shared {
                source,
                events,
                state,
            }),
            debounce,
            active: Mutex::new(None),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn source_name(&self) -> &str {
        self.shared.source.source_name()
    }

    /// Schedule a fetch after the debounce window, superseding any pending
    /// or in-flight request. Must be called inside a tokio runtime.
    pub fn request(&self, request: ReportRequest) {
        self.issue(request, self.debounce);
    }

    /// Re-issue the last request immediately after a failure
    pub fn retry(&self) -> bool {
        let last = {
            let state = self.shared.state.borrow();
            match (&state.phase, &state.last_request) {
                (FetchPhase::Failed(_), Some(request)) => request.clone(),
                _ => return false,
            }
        };
        tracing::info!(profile = %last.profile_id, "retrying report fetch");
        self.issue(last, Duration::ZERO);
        true
    }

    /// Abort the active fetch, if any, and return to idle
    pub fn cancel(&self) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            previous.token.cancel();
            self.shared.transition(previous.generation, |s| {
                s.generation += 1;
                if s.phase.is_busy() {
                    s.phase = FetchPhase::Idle;
                }
            });
        }
    }

    fn issue(&self, request: ReportRequest, delay: Duration) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            tracing::debug!(generation = previous.generation, "superseding fetch");
            previous.token.cancel();
        }

        let mut generation = 0;
        self.shared.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.phase = FetchPhase::Debouncing;
            s.last_request = Some(request.clone());
        });

        let token = CancellationToken::new();
        tokio::spawn(Arc::clone(&self.shared).run(generation, token.clone(), request, delay));
        *active = Some(ActiveFetch { generation, token });
    }

    /// Current state snapshot
    pub fn state(&self) -> FetchState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.shared.state.subscribe()
    }
}

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.token.cancel();
        }
    }
}
