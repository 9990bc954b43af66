use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub classifier: ClassifierConfig,
    pub executor: ExecutorConfig,
}

impl AnalysisConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| AnalysisError::Config(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configuration values for consistency.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.executor.role_timeout_secs == 0 {
            errors.push("executor.role_timeout_secs must be greater than 0");
        }
        if self.executor.max_parallel_roles == 0 {
            errors.push("executor.max_parallel_roles must be greater than 0");
        }
        if self.classifier.creative_keywords.is_empty() {
            errors.push("classifier.creative_keywords must not be empty");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::Config(errors.join("; ")))
        }
    }
}

/// Tunables for the complexity classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Title keywords signaling unusual or experimental work (+2 score).
    pub creative_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            creative_keywords: [
                "experimental",
                "prototype",
                "unusual",
                "custom",
                "non-standard",
                "special construction",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Tunables for the workflow executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Deadline per specialist invocation.
    pub role_timeout_secs: u64,
    /// Fan-out cap inside a parallel phase.
    pub max_parallel_roles: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            role_timeout_secs: 120,
            max_parallel_roles: 4,
        }
    }
}
