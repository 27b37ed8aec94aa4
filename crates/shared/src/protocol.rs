//! GraphQL request and response shapes for the console API.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{domain::DistributionRecord, error::TransportError};

pub const LIST_DISTRIBUTION_QUERY: &str = "query ListDistribution($page: Int, $count: Int) {
  listDistribution(page: $page, count: $count) {
    id
    domainName
  }
}";

pub const BEHAVIOR_BY_ID_QUERY: &str = "query BehaviorById($id: String) {
  behaviorById(id: $id)
}";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<V> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListDistributionVariables {
    pub page: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BehaviorByIdVariables {
    pub id: String,
}

pub fn list_distribution_request(
    page: u32,
    count: u32,
) -> GraphQlRequest<ListDistributionVariables> {
    GraphQlRequest {
        query: LIST_DISTRIBUTION_QUERY,
        variables: ListDistributionVariables { page, count },
    }
}

pub fn behavior_by_id_request(id: &str) -> GraphQlRequest<BehaviorByIdVariables> {
    GraphQlRequest {
        query: BEHAVIOR_BY_ID_QUERY,
        variables: BehaviorByIdVariables { id: id.to_string() },
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

impl<D> GraphQlResponse<D> {
    /// Reports the first GraphQL error if any, otherwise the `data` payload.
    pub fn into_data(self) -> Result<D, TransportError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(TransportError::GraphQl(first.message));
        }
        self.data.ok_or(TransportError::MissingField("data"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDistributionData {
    #[serde(default)]
    pub list_distribution: Option<Vec<DistributionRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorByIdData {
    #[serde(default)]
    pub behavior_by_id: Option<Vec<String>>,
}

pub fn decode_response<D: DeserializeOwned>(body: &[u8]) -> Result<D, TransportError> {
    let response: GraphQlResponse<D> = serde_json::from_slice(body)?;
    response.into_data()
}
