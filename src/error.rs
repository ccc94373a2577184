use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a stage. Everything value-level is coerced to
/// a missing value instead and never surfaces here.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("column `{column}` not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),

    #[error("environment variable `{name}` has invalid value `{value}`")]
    InvalidEnv { name: &'static str, value: String },
}
