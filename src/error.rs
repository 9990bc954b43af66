use thiserror::Error;

use crate::domain::Role;

/// Crate-wide error type.
///
/// Planning defects are fatal and surface as `Err` from `analyze()`.
/// Individual specialist failures are never errors at this level - they are
/// recorded as `RoleOutput::Failure` and the run completes.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("dependency cycle in role table: {path}")]
    DependencyCycle { path: String },

    #[error("no dependency table entry for role: {0}")]
    UnknownRole(Role),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("specialist invocation failed: {0}")]
    Invocation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
