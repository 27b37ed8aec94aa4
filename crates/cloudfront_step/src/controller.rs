use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use console_client::DeployQueries;
use shared::{domain::DistributionId, error::TransportError};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    config::StepConfig,
    error::CascadeError,
    options::{BehaviorOption, DistributionOption},
    presentation::{
        notice_for, FieldErrors, NoopSelectionHooks, SelectionHooks, StepEvent, StepPresentation,
        StepView, ValidationView,
    },
    sources::{BehaviorSource, DistributionSource},
    state::{FailedSource, LoadFailure, LoadingState, SelectionState, StepState},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct ControllerState {
    initialized: bool,
    loading: LoadingState,
    distribution_options: Vec<DistributionOption>,
    behavior_options: Vec<BehaviorOption>,
    selection: SelectionState,
    epoch: u64,
    last_failure: Option<LoadFailure>,
}

impl ControllerState {
    fn step_state(&self) -> StepState {
        if !self.initialized {
            StepState::Init
        } else if self.loading.distributions_loading {
            StepState::DistributionsLoading
        } else if self.loading.behaviors_loading {
            StepState::BehaviorsLoading
        } else if self.selection.distribution.is_some() {
            StepState::BehaviorsReady
        } else {
            StepState::DistributionsReady
        }
    }

    fn clear_failure(&mut self, source: FailedSource) {
        if self
            .last_failure
            .as_ref()
            .is_some_and(|failure| failure.source == source)
        {
            self.last_failure = None;
        }
    }
}

struct BehaviorTicket {
    distribution_id: DistributionId,
    epoch: u64,
}

/// Owns the step's selection and loading state. The lock is never held
/// across a fetch.
pub struct CascadeController {
    distributions: DistributionSource,
    behaviors: BehaviorSource,
    hooks: Arc<dyn SelectionHooks>,
    config: StepConfig,
    inner: Mutex<ControllerState>,
    active: AtomicBool,
    events: broadcast::Sender<StepEvent>,
}

impl CascadeController {
    pub fn new(queries: Arc<dyn DeployQueries>) -> Arc<Self> {
        Self::new_with_hooks(queries, Arc::new(NoopSelectionHooks), StepConfig::default())
    }

    pub fn new_with_hooks(
        queries: Arc<dyn DeployQueries>,
        hooks: Arc<dyn SelectionHooks>,
        config: StepConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            distributions: DistributionSource::new(
                Arc::clone(&queries),
                config.distribution_page,
                config.distribution_count,
            ),
            behaviors: BehaviorSource::new(queries),
            hooks,
            config,
            inner: Mutex::new(ControllerState::default()),
            active: AtomicBool::new(true),
            events,
        })
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: StepEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StepEvent> {
        self.events.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            debug!("cloudfront step shut down");
        }
    }

    pub fn step_state(&self) -> StepState {
        self.state().step_state()
    }

    pub fn loading(&self) -> LoadingState {
        self.state().loading
    }

    pub fn distribution_options(&self) -> Vec<DistributionOption> {
        self.state().distribution_options.clone()
    }

    pub fn behavior_options(&self) -> Vec<BehaviorOption> {
        self.state().behavior_options.clone()
    }

    pub fn selection(&self) -> SelectionState {
        self.state().selection.clone()
    }

    pub fn last_failure(&self) -> Option<LoadFailure> {
        self.state().last_failure.clone()
    }

    pub fn view(&self) -> StepView {
        let state = self.state();
        StepView {
            state: state.step_state(),
            loading: state.loading,
            distribution_options: state.distribution_options.clone(),
            behavior_options: state.behavior_options.clone(),
            selection: state.selection.clone(),
            notice: notice_for(state.last_failure.as_ref(), self.config.error_display),
        }
    }

    pub fn present(&self, validation: &ValidationView) -> StepPresentation {
        StepPresentation {
            view: self.view(),
            errors: FieldErrors::from_validation(validation),
        }
    }

    pub async fn initialize(&self) {
        if self.begin_initialize() {
            self.finish_initialize().await;
        }
    }

    pub fn spawn_initialize(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.begin_initialize() {
            return None;
        }
        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            controller.finish_initialize().await;
        }))
    }

    fn begin_initialize(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        {
            let mut state = self.state();
            if state.initialized {
                debug!("distribution list already requested");
                return false;
            }
            state.initialized = true;
            state.loading.distributions_loading = true;
            state.distribution_options.clear();
        }
        self.emit(StepEvent::DistributionsLoading);
        true
    }

    async fn finish_initialize(&self) {
        let result = self.distributions.load().await;
        if !self.is_active() {
            debug!("discarding distribution list after shutdown");
            return;
        }
        self.apply_distributions(result);
    }

    fn apply_distributions(&self, result: Result<Vec<DistributionOption>, TransportError>) {
        let event = {
            let mut state = self.state();
            state.loading.distributions_loading = false;
            match result {
                Ok(options) => {
                    info!(count = options.len(), "distributions loaded");
                    let count = options.len();
                    state.distribution_options = options;
                    state.clear_failure(FailedSource::Distributions);
                    StepEvent::DistributionsLoaded { count }
                }
                Err(err) => {
                    error!(error = %err, "failed to load distributions");
                    state.distribution_options.clear();
                    let failure = LoadFailure {
                        source: FailedSource::Distributions,
                        message: err.to_string(),
                    };
                    state.last_failure = Some(failure.clone());
                    StepEvent::LoadFailed(failure)
                }
            }
        };
        self.emit(event);
    }

    /// Selects a distribution and loads its behaviors.
    ///
    /// Transport failures are absorbed; only rejected selections return an
    /// error. An option with an empty id is recorded without a fetch.
    pub async fn select_distribution(&self, option: &DistributionOption) -> Result<(), CascadeError> {
        if let Some(ticket) = self.begin_selection(option)? {
            self.finish_selection(ticket).await;
        }
        Ok(())
    }

    /// The reset is applied before returning; the fetch, if any, runs on a
    /// spawned task.
    pub fn spawn_select_distribution(
        self: &Arc<Self>,
        option: &DistributionOption,
    ) -> Result<Option<JoinHandle<()>>, CascadeError> {
        let Some(ticket) = self.begin_selection(option)? else {
            return Ok(None);
        };
        let controller = Arc::clone(self);
        Ok(Some(tokio::spawn(async move {
            controller.finish_selection(ticket).await;
        })))
    }

    pub async fn select_distribution_by_id(&self, id: &str) -> Result<(), CascadeError> {
        let option = self
            .state()
            .distribution_options
            .iter()
            .find(|candidate| candidate.value == id)
            .cloned()
            .ok_or_else(|| CascadeError::UnknownDistribution(id.to_string()))?;
        self.select_distribution(&option).await
    }

    // Hooks run under the state lock so the wizard sees changes in the same
    // order the controller applied them.
    fn begin_selection(
        &self,
        option: &DistributionOption,
    ) -> Result<Option<BehaviorTicket>, CascadeError> {
        if !self.is_active() {
            return Err(CascadeError::ShutDown);
        }
        let (ticket, selection) = {
            let mut state = self.state();
            let Some(known) = state
                .distribution_options
                .iter()
                .find(|candidate| candidate.value == option.value)
                .cloned()
            else {
                warn!(distribution_id = %option.value, "rejected unknown distribution");
                return Err(CascadeError::UnknownDistribution(option.value.clone()));
            };

            state.epoch += 1;
            state.selection.behaviors.clear();
            state.behavior_options.clear();
            state.selection.distribution = Some(known.clone());
            state.clear_failure(FailedSource::Behaviors);

            let ticket = if known.value.is_empty() {
                debug!(label = %known.label, "distribution has no id; skipping behavior fetch");
                state.loading.behaviors_loading = false;
                None
            } else {
                state.loading.behaviors_loading = true;
                Some(BehaviorTicket {
                    distribution_id: DistributionId(known.value),
                    epoch: state.epoch,
                })
            };

            self.hooks.distribution_changed(state.selection.distribution.as_ref());
            self.hooks.behaviors_changed(&[]);
            (ticket, state.selection.clone())
        };

        self.emit(StepEvent::SelectionChanged(selection));
        if let Some(ticket) = &ticket {
            self.emit(StepEvent::BehaviorsLoading {
                distribution_id: ticket.distribution_id.to_string(),
                epoch: ticket.epoch,
            });
        }
        Ok(ticket)
    }

    async fn finish_selection(&self, ticket: BehaviorTicket) {
        let result = self.behaviors.load(&ticket.distribution_id).await;
        if !self.is_active() {
            debug!(distribution_id = %ticket.distribution_id, "discarding behaviors after shutdown");
            return;
        }
        self.apply_behaviors(ticket, result);
    }

    fn apply_behaviors(
        &self,
        ticket: BehaviorTicket,
        result: Result<Vec<BehaviorOption>, TransportError>,
    ) {
        let distribution_id = ticket.distribution_id.to_string();
        let event = {
            let mut state = self.state();
            if state.epoch != ticket.epoch {
                debug!(
                    distribution_id = %distribution_id,
                    epoch = ticket.epoch,
                    current_epoch = state.epoch,
                    "discarding behaviors for superseded selection"
                );
                StepEvent::StaleBehaviorsDiscarded {
                    distribution_id,
                    epoch: ticket.epoch,
                }
            } else {
                state.loading.behaviors_loading = false;
                match result {
                    Ok(options) => {
                        info!(distribution_id = %distribution_id, count = options.len(), "behaviors loaded");
                        let count = options.len();
                        state.behavior_options = options;
                        StepEvent::BehaviorsLoaded {
                            distribution_id,
                            count,
                        }
                    }
                    Err(err) => {
                        error!(distribution_id = %distribution_id, error = %err, "failed to load behaviors");
                        state.behavior_options.clear();
                        let failure = LoadFailure {
                            source: FailedSource::Behaviors,
                            message: err.to_string(),
                        };
                        state.last_failure = Some(failure.clone());
                        StepEvent::LoadFailed(failure)
                    }
                }
            }
        };
        self.emit(event);
    }

    pub fn select_behaviors<I, S>(&self, values: I) -> Result<(), CascadeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.is_active() {
            return Err(CascadeError::ShutDown);
        }
        let selection = {
            let mut state = self.state();
            if state.selection.distribution.is_none() {
                return Err(CascadeError::NoDistributionSelected);
            }

            let mut behaviors: Vec<String> = Vec::new();
            for value in values {
                let value = value.into();
                if !state
                    .behavior_options
                    .iter()
                    .any(|option| option.value == value)
                {
                    warn!(behavior = %value, "rejected unknown behavior");
                    return Err(CascadeError::UnknownBehavior(value));
                }
                if !behaviors.contains(&value) {
                    behaviors.push(value);
                }
            }
            state.selection.behaviors = behaviors;
            self.hooks.behaviors_changed(&state.selection.behaviors);
            state.selection.clone()
        };

        self.emit(StepEvent::SelectionChanged(selection));
        Ok(())
    }

    pub fn clear_distribution(&self) -> Result<(), CascadeError> {
        if !self.is_active() {
            return Err(CascadeError::ShutDown);
        }
        let selection = {
            let mut state = self.state();
            state.epoch += 1;
            state.selection = SelectionState::default();
            state.behavior_options.clear();
            state.loading.behaviors_loading = false;
            state.clear_failure(FailedSource::Behaviors);
            self.hooks.distribution_changed(None);
            self.hooks.behaviors_changed(&[]);
            state.selection.clone()
        };

        self.emit(StepEvent::SelectionChanged(selection));
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
