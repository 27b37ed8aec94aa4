use std::sync::Arc;

use console_client::DeployQueries;
use shared::{domain::DistributionId, error::TransportError};
use tracing::info;

use crate::options::{behavior_options, distribution_options, BehaviorOption, DistributionOption};

pub struct DistributionSource {
    queries: Arc<dyn DeployQueries>,
    page: u32,
    count: u32,
}

impl DistributionSource {
    pub fn new(queries: Arc<dyn DeployQueries>, page: u32, count: u32) -> Self {
        Self {
            queries,
            page,
            count,
        }
    }

    pub async fn load(&self) -> Result<Vec<DistributionOption>, TransportError> {
        info!(page = self.page, count = self.count, "loading distributions");
        let records = self
            .queries
            .list_distributions(self.page, self.count)
            .await?;
        Ok(distribution_options(&records))
    }
}

pub struct BehaviorSource {
    queries: Arc<dyn DeployQueries>,
}

impl BehaviorSource {
    pub fn new(queries: Arc<dyn DeployQueries>) -> Self {
        Self { queries }
    }

    pub async fn load(&self, id: &DistributionId) -> Result<Vec<BehaviorOption>, TransportError> {
        info!(distribution_id = %id, "loading behaviors");
        let behaviors = self.queries.behavior_by_id(id).await?;
        Ok(behavior_options(&behaviors))
    }
}
