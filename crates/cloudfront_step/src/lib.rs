//! Distribution and behavior selection step of the deployment wizard.
//!
//! The [`CascadeController`] loads the distribution list once, then loads the
//! behavior list for whichever distribution is selected. Behavior results are
//! tagged with a selection epoch so a response for a superseded distribution
//! is never applied.

pub mod config;
pub mod controller;
pub mod error;
pub mod options;
pub mod presentation;
pub mod sources;
pub mod state;

pub use config::{ErrorDisplay, StepConfig};
pub use controller::CascadeController;
pub use error::CascadeError;
pub use options::{BehaviorOption, DistributionOption};
pub use presentation::{
    FieldErrors, FieldMessage, NoopSelectionHooks, SelectionHooks, StepEvent, StepPresentation,
    StepView, ValidationView,
};
pub use sources::{BehaviorSource, DistributionSource};
pub use state::{FailedSource, LoadFailure, LoadingState, SelectionState, StepState};
