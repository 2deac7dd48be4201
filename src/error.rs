use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

pub type StoreResult<T> = Result<T, StoreError>;
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type AppResult<T> = Result<T, AppError>;

/// Failures of the backing data file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog data: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to encode catalog: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("save task did not complete: {0}")]
    Interrupted(#[source] tokio::task::JoinError),
}

/// Failures of a catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Product not found")]
    NotFound,

    #[error("No product id available: largest id is {}", i64::MAX)]
    IdsExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced to HTTP clients as an error envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Storage(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Maps a catalog failure, prefixing persistence causes with `save_context`.
    pub fn from_catalog(err: CatalogError, save_context: &str) -> Self {
        match err {
            CatalogError::MissingField(_) => Self::validation(err.to_string()),
            CatalogError::NotFound => Self::not_found(err.to_string()),
            CatalogError::IdsExhausted => Self::storage(err.to_string()),
            CatalogError::Store(cause) => Self::storage(format!("{save_context}: {cause}")),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Storage(message) = &self {
            tracing::error!(error = %message, "request failed on persistence");
        }
        Envelope::error(self.status_code(), self.to_string()).into_response()
    }
}
