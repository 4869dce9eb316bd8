use crate::store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadParams(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    /// A recorded calendar write failed; the record explains what was undone.
    #[error("{message}")]
    MutationFailed {
        mutation_id: u64,
        message: String,
        compensated: bool,
    },

    #[error("{0:#}")]
    Io(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::BadParams(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.code(),
            Self::BadParams(_) => "bad_params",
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::MutationFailed { .. } => "mutation_failed",
            Self::Io(_) => "io_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::MutationFailed {
                mutation_id,
                compensated,
                ..
            } => Some(json!({
                "mutationId": mutation_id,
                "compensated": compensated,
            })),
            Self::Store(StoreError::NotFound { collection, id }) => Some(json!({
                "collection": collection.as_str(),
                "id": id,
            })),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
