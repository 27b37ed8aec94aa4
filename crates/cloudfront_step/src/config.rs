use serde::Deserialize;

pub const DEFAULT_DISTRIBUTION_PAGE: u32 = 1;
pub const DEFAULT_DISTRIBUTION_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDisplay {
    #[default]
    Visible,
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub distribution_page: u32,
    pub distribution_count: u32,
    pub error_display: ErrorDisplay,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            distribution_page: DEFAULT_DISTRIBUTION_PAGE,
            distribution_count: DEFAULT_DISTRIBUTION_COUNT,
            error_display: ErrorDisplay::Visible,
        }
    }
}
