use siirut_core::{ExtractError, RutError};
use thiserror::Error;

use crate::captcha::CaptchaError;
use crate::transport::TransportError;

/// Failure of a taxpayer lookup, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid RUT input: {0:?}")]
    InvalidInput(String),

    #[error("normalised RUT must be {expected} characters, got {len}")]
    InvalidRutLength { len: usize, expected: usize },

    #[error("error fetching captcha: {0}")]
    CaptchaFetchFailed(#[source] CaptchaError),

    #[error("lookup request failed: {0}")]
    Network(#[from] TransportError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}

impl From<RutError> for ServiceError {
    fn from(err: RutError) -> Self {
        match err {
            RutError::InvalidInput(raw) => Self::InvalidInput(raw),
            RutError::InvalidRutLength { len, expected } => {
                Self::InvalidRutLength { len, expected }
            }
        }
    }
}
