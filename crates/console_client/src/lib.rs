use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{DistributionId, DistributionRecord},
    error::TransportError,
    protocol::{
        behavior_by_id_request, decode_response, list_distribution_request, BehaviorByIdData,
        GraphQlRequest, ListDistributionData,
    },
};
use tracing::{debug, warn};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only queries the deployment wizard issues against the console API.
#[async_trait]
pub trait DeployQueries: Send + Sync {
    async fn list_distributions(
        &self,
        page: u32,
        count: u32,
    ) -> Result<Vec<DistributionRecord>, TransportError>;
    async fn behavior_by_id(&self, id: &DistributionId) -> Result<Vec<String>, TransportError>;
}

pub struct MissingDeployQueries;

#[async_trait]
impl DeployQueries for MissingDeployQueries {
    async fn list_distributions(
        &self,
        _page: u32,
        _count: u32,
    ) -> Result<Vec<DistributionRecord>, TransportError> {
        Err(TransportError::Unavailable(
            "no console transport configured".into(),
        ))
    }

    async fn behavior_by_id(&self, id: &DistributionId) -> Result<Vec<String>, TransportError> {
        Err(TransportError::Unavailable(format!(
            "no console transport configured for distribution {id}"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleClientOptions {
    pub api_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
}

impl ConsoleClientOptions {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// GraphQL-over-HTTP client for the console API.
pub struct ConsoleClient {
    http: Client,
    api_url: Url,
    api_token: Option<String>,
}

impl ConsoleClient {
    pub fn new(options: ConsoleClientOptions) -> Result<Self, TransportError> {
        let api_url = Url::parse(options.api_url.trim())
            .map_err(|err| TransportError::Unavailable(format!("invalid api url: {err}")))?;
        let http = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;
        Ok(Self {
            http,
            api_url,
            api_token: options
                .api_token
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn post_query<V, D>(&self, request: &GraphQlRequest<V>) -> Result<D, TransportError>
    where
        V: Serialize + Sync,
        D: DeserializeOwned,
    {
        let mut builder = self.http.post(self.api_url.clone()).json(request);
        if let Some(token) = &self.api_token {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        let res = builder
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "console api rejected query");
            return Err(TransportError::Status(status.as_u16()));
        }
        let body = res
            .bytes()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;
        decode_response(&body)
    }
}

#[async_trait]
impl DeployQueries for ConsoleClient {
    async fn list_distributions(
        &self,
        page: u32,
        count: u32,
    ) -> Result<Vec<DistributionRecord>, TransportError> {
        let data: ListDistributionData = self
            .post_query(&list_distribution_request(page, count))
            .await?;
        let records = data.list_distribution.unwrap_or_default();
        debug!(page, count, returned = records.len(), "listed distributions");
        Ok(records)
    }

    async fn behavior_by_id(&self, id: &DistributionId) -> Result<Vec<String>, TransportError> {
        let data: BehaviorByIdData = self
            .post_query(&behavior_by_id_request(id.as_str()))
            .await?;
        let behaviors = data.behavior_by_id.unwrap_or_default();
        debug!(distribution_id = %id, returned = behaviors.len(), "listed behaviors");
        Ok(behaviors)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
