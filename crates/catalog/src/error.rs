use thiserror::Error;

use stockpilot_core::DomainError;

/// Terminal failure of a resilient catalog lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Every attempt in the retry budget hit a transient failure.
    #[error("catalog unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable { attempts, message } => {
                DomainError::RemoteUnavailable { attempts, message }
            }
        }
    }
}
