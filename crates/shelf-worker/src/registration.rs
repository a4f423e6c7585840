//! Host-side registration: worker lifecycle and page control.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use shelf_core::{LifecycleObserver, Request, WorkerState};
use tracing::{debug, info, warn};

use crate::activate::ActivationReport;
use crate::controller::{ControllerAssignment, PageId};
use crate::error::{InstallError, ServeError};
use crate::install::InstallReport;
use crate::message::ControlMessage;
use crate::network::Network;
use crate::strategy::{ResponseSource, Served};
use crate::worker::{Worker, WorkerId};

/// Result of registering a new worker version.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Precache results.
    pub install: InstallReport,
    /// Cleanup results, if the worker activated right away.
    pub activation: Option<ActivationReport>,
    /// State the new worker ended in.
    pub state: WorkerState,
}

/// Owns the installing, waiting and active worker slots for one scope and
/// decides which worker controls each open page.
pub struct Registration {
    network: Arc<dyn Network>,
    waiting: Option<Arc<Worker>>,
    active: Option<Arc<Worker>>,
    states: HashMap<WorkerId, WorkerState>,
    pages: ControllerAssignment,
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl Registration {
    /// Create an empty registration. Uncontrolled pages use `network`.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self {
            network,
            waiting: None,
            active: None,
            states: HashMap::new(),
            pages: ControllerAssignment::new(),
            observers: Vec::new(),
        }
    }

    /// Add a lifecycle observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn active(&self) -> Option<&Arc<Worker>> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&Arc<Worker>> {
        self.waiting.as_ref()
    }

    /// Last known state of a worker.
    pub fn state_of(&self, worker: WorkerId) -> Option<WorkerState> {
        self.states.get(&worker).copied()
    }

    /// Install a new worker version.
    ///
    /// The worker activates at once when nothing is active or it asked to
    /// skip waiting; otherwise it waits, replacing any previously waiting
    /// worker. A failed install leaves the worker redundant.
    pub async fn update(&mut self, worker: Worker) -> Result<UpdateOutcome, InstallError> {
        let worker = Arc::new(worker);
        self.set_state(&worker, WorkerState::Parsed);
        self.set_state(&worker, WorkerState::Installing);

        let outcome = match worker.install().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.set_state(&worker, WorkerState::Redundant);
                return Err(e);
            }
        };
        self.set_state(&worker, WorkerState::Installed);

        if let Some(previous) = self.waiting.take() {
            self.set_state(&previous, WorkerState::Redundant);
        }

        let activation = if self.active.is_none() || outcome.skip_waiting {
            Some(self.activate(worker.clone()).await)
        } else {
            info!(version = %worker.version(), "worker waiting for activation");
            self.waiting = Some(worker.clone());
            None
        };

        Ok(UpdateOutcome {
            install: outcome.report,
            activation,
            state: self.state_of(worker.id()).unwrap_or(WorkerState::Installed),
        })
    }

    /// Promote the waiting worker, if any.
    pub async fn activate_waiting(&mut self) -> Option<ActivationReport> {
        let worker = self.waiting.take()?;
        Some(self.activate(worker).await)
    }

    async fn activate(&mut self, worker: Arc<Worker>) -> ActivationReport {
        let previous = self.active.take();
        if let Some(previous) = &previous {
            self.set_state(previous, WorkerState::Redundant);
        }

        self.set_state(&worker, WorkerState::Activating);
        let outcome = worker.activate().await;
        self.set_state(&worker, WorkerState::Activated);

        let changed = self.pages.assign_on_activation(
            previous.as_ref().map(|w| w.id()),
            worker.id(),
            outcome.claim,
        );
        debug!(version = %worker.version(), pages = changed, "controller assignment updated");

        self.active = Some(worker);
        outcome.report
    }

    /// Deliver a control message to the waiting worker, else the active one.
    ///
    /// Returns the cleanup report when the message promoted a waiting worker.
    pub async fn post_message(&mut self, message: &Value) -> Option<ActivationReport> {
        let target = self.waiting.clone().or_else(|| self.active.clone())?;
        match target.handle_message(message)? {
            ControlMessage::SkipWaiting => {
                let is_waiting = self.waiting.as_ref().is_some_and(|w| w.id() == target.id());
                if is_waiting {
                    info!(version = %target.version(), "skip waiting requested");
                    self.activate_waiting().await
                } else {
                    None
                }
            }
        }
    }

    /// Open a page; it is controlled by the active worker, if any.
    pub fn open_page(&mut self) -> PageId {
        self.pages.open(self.active.as_ref().map(|w| w.id()))
    }

    pub fn close_page(&mut self, page: PageId) -> bool {
        self.pages.close(page)
    }

    /// The worker controlling a page.
    pub fn controller_of(&self, page: PageId) -> Option<Arc<Worker>> {
        let id = self.pages.controller_of(page)?;
        [&self.active, &self.waiting]
            .into_iter()
            .flatten()
            .find(|w| w.id() == id)
            .cloned()
    }

    /// Route a page's request through its controller. Uncontrolled pages, and
    /// pages whose controller cannot intercept fetches, go straight to the
    /// network.
    pub async fn fetch(&self, page: PageId, request: &Request) -> Result<Served, ServeError> {
        let controller = self.controller_of(page).filter(|worker| {
            self.state_of(worker.id())
                .is_some_and(|state| state.can_intercept_fetch())
        });
        match controller {
            Some(worker) => worker.handle_fetch(request).await,
            None => {
                debug!(page = %page, request = %request, "uncontrolled page");
                self.network
                    .fetch(request)
                    .await
                    .map(|response| Served {
                        response,
                        source: ResponseSource::Network,
                    })
                    .map_err(|source| ServeError::Network {
                        url: request.url().to_string(),
                        source,
                    })
            }
        }
    }

    /// Wait for background work of the current workers.
    pub async fn settle(&self) {
        for worker in [&self.active, &self.waiting].into_iter().flatten() {
            worker.settle().await;
        }
    }

    fn set_state(&mut self, worker: &Worker, state: WorkerState) {
        let previous = self.states.insert(worker.id(), state);
        if previous == Some(state) {
            return;
        }
        if state.is_terminal() {
            worker.retire();
            warn!(worker = %worker.id(), version = %worker.version(), "worker redundant");
        } else {
            info!(worker = %worker.id(), version = %worker.version(), state = %state, "worker state changed");
        }
        for observer in &self.observers {
            observer.on_state_change(worker.version().as_str(), state);
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("waiting", &self.waiting)
            .field("active", &self.active)
            .field("pages", &self.pages)
            .finish()
    }
}
