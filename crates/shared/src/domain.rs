use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(DistributionId);

/// A distribution as listed by the console backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub domain_name: String,
}

impl DistributionRecord {
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
        }
    }
}
