//! Stand-in for the deployment wizard that owns the canonical selection.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cloudfront_step::{DistributionOption, SelectionHooks, ValidationView};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSelection {
    pub distribution: Option<DistributionOption>,
    pub behaviors: Vec<String>,
}

#[derive(Default)]
pub struct WizardSelection {
    inner: Mutex<ExtensionSelection>,
}

impl WizardSelection {
    fn selection(&self) -> MutexGuard<'_, ExtensionSelection> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ExtensionSelection {
        self.selection().clone()
    }

    pub fn validation(&self) -> ValidationView {
        let selection = self.selection();
        ValidationView {
            distribution_empty: selection
                .distribution
                .as_ref()
                .map_or(true, |d| d.value.is_empty()),
            behavior_empty: selection.behaviors.is_empty(),
        }
    }
}

impl SelectionHooks for WizardSelection {
    fn distribution_changed(&self, distribution: Option<&DistributionOption>) {
        self.selection().distribution = distribution.cloned();
    }

    fn behaviors_changed(&self, behaviors: &[String]) {
        self.selection().behaviors = behaviors.to_vec();
    }
}
