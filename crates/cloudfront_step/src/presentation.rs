//! Boundary between the controller and whatever renders the step.

use serde::{Deserialize, Serialize};

use crate::{
    config::ErrorDisplay,
    options::{BehaviorOption, DistributionOption},
    state::{FailedSource, LoadFailure, LoadingState, SelectionState, StepState},
};

/// Forwards selection changes to the wizard that owns the canonical selection.
///
/// Called while the controller's state lock is held; implementations must not
/// call back into the controller.
pub trait SelectionHooks: Send + Sync {
    fn distribution_changed(&self, distribution: Option<&DistributionOption>);
    fn behaviors_changed(&self, behaviors: &[String]);
}

pub struct NoopSelectionHooks;

impl SelectionHooks for NoopSelectionHooks {
    fn distribution_changed(&self, _distribution: Option<&DistributionOption>) {}

    fn behaviors_changed(&self, _behaviors: &[String]) {}
}

/// Validation flags computed by the wizard. Read-only here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationView {
    pub distribution_empty: bool,
    pub behavior_empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMessage {
    pub key: &'static str,
    pub text: &'static str,
}

const CHOOSE_DISTRIBUTION_ERROR: FieldMessage = FieldMessage {
    key: "deploy.chooseCF.chooseCFDError",
    text: "Please choose a CloudFront distribution",
};

const SELECT_BEHAVIOR_ERROR: FieldMessage = FieldMessage {
    key: "deploy.chooseCF.selectBehaviorError",
    text: "Please select at least one behavior",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub distribution: Option<FieldMessage>,
    pub behaviors: Option<FieldMessage>,
}

impl FieldErrors {
    pub fn from_validation(validation: &ValidationView) -> Self {
        Self {
            distribution: validation
                .distribution_empty
                .then_some(CHOOSE_DISTRIBUTION_ERROR),
            behaviors: validation.behavior_empty.then_some(SELECT_BEHAVIOR_ERROR),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distribution.is_none() && self.behaviors.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub state: StepState,
    pub loading: LoadingState,
    pub distribution_options: Vec<DistributionOption>,
    pub behavior_options: Vec<BehaviorOption>,
    pub selection: SelectionState,
    pub notice: Option<String>,
}

impl StepView {
    pub fn distributions_loading(&self) -> bool {
        self.loading.distributions_loading
    }

    pub fn behaviors_loading(&self) -> bool {
        self.loading.behaviors_loading
    }
}

pub(crate) fn notice_for(failure: Option<&LoadFailure>, display: ErrorDisplay) -> Option<String> {
    match display {
        ErrorDisplay::Silent => None,
        ErrorDisplay::Visible => failure.map(|failure| match failure.source {
            FailedSource::Distributions => {
                format!("Failed to load distributions: {}", failure.message)
            }
            FailedSource::Behaviors => {
                format!("Failed to load behaviors: {}", failure.message)
            }
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPresentation {
    pub view: StepView,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    DistributionsLoading,
    DistributionsLoaded { count: usize },
    SelectionChanged(SelectionState),
    BehaviorsLoading { distribution_id: String, epoch: u64 },
    BehaviorsLoaded { distribution_id: String, count: usize },
    StaleBehaviorsDiscarded { distribution_id: String, epoch: u64 },
    LoadFailed(LoadFailure),
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
