//! Error taxonomy shared by the catalog client and the controller

use serde::{Deserialize, Serialize};

/// Failure of a single catalog request.
///
/// Errors travel inside actions, so they are plain data: cloneable,
/// comparable and serialisable for the debug recorder.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    #[error("unexpected response format: {0}")]
    UnexpectedContentType(String),
    #[error("response parse error: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Http { status: 404 })
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => CatalogError::Http {
                status: status.as_u16(),
            },
            None => CatalogError::Network(err.to_string()),
        }
    }
}
