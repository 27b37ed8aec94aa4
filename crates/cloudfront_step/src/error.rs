use thiserror::Error;

/// Rejected selection requests. Transport failures never surface here; they
/// degrade to an empty option list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error("distribution {0} is not in the loaded distribution list")]
    UnknownDistribution(String),
    #[error("behavior {0} is not offered for the selected distribution")]
    UnknownBehavior(String),
    #[error("no distribution is selected")]
    NoDistributionSelected,
    #[error("the deployment step has been shut down")]
    ShutDown,
}
