use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUDGET: i64 = 8_000;
pub const DEFAULT_PREVIEW_LENGTH: usize = 200;

const BUDGET_ENV: &str = "DISCLOSURE_BUDGET";
const PREVIEW_LENGTH_ENV: &str = "DISCLOSURE_PREVIEW_LENGTH";

/// Engine knobs shared by the orchestrator and its callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Weight ceiling for one query (estimated tokens)
    pub budget: i64,

    /// Characters kept by previews before the truncation marker
    pub preview_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|err| SearchError::ConfigParse(format!("TOML: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| SearchError::ConfigParse(format!("JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DISCLOSURE_BUDGET` / `DISCLOSURE_PREVIEW_LENGTH` when set.
    /// Blank or unparsable values keep the current setting.
    pub fn with_env_overrides(self) -> Self {
        let budget = std::env::var(BUDGET_ENV).ok();
        let preview_length = std::env::var(PREVIEW_LENGTH_ENV).ok();
        self.with_overrides(budget.as_deref(), preview_length.as_deref())
    }

    fn with_overrides(self, budget: Option<&str>, preview_length: Option<&str>) -> Self {
        Self {
            budget: parse_or(budget, self.budget),
            preview_length: parse_or(preview_length, self.preview_length),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.preview_length == 0 {
            return Err(SearchError::InvalidConfig(
                "preview_length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default_value: T) -> T {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default_value)
}
