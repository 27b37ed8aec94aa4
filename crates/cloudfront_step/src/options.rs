use serde::{Deserialize, Serialize};
use shared::domain::DistributionRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorOption {
    pub label: String,
    pub value: String,
}

pub fn to_distribution_option(record: &DistributionRecord) -> DistributionOption {
    DistributionOption {
        label: format!("{}({})", record.id, record.domain_name),
        value: record.id.clone(),
    }
}

pub fn to_behavior_option(behavior: &str) -> BehaviorOption {
    BehaviorOption {
        label: behavior.to_string(),
        value: behavior.to_string(),
    }
}

pub fn distribution_options(records: &[DistributionRecord]) -> Vec<DistributionOption> {
    records.iter().map(to_distribution_option).collect()
}

pub fn behavior_options(behaviors: &[String]) -> Vec<BehaviorOption> {
    behaviors.iter().map(|b| to_behavior_option(b)).collect()
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
