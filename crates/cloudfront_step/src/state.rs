use serde::Serialize;

use crate::options::DistributionOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Init,
    DistributionsLoading,
    DistributionsReady,
    BehaviorsLoading,
    BehaviorsReady,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadingState {
    pub distributions_loading: bool,
    pub behaviors_loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub distribution: Option<DistributionOption>,
    pub behaviors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedSource {
    Distributions,
    Behaviors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub source: FailedSource,
    pub message: String,
}
