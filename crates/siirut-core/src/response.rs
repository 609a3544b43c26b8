//! JSON shapes handed back to callers of the lookup.

use serde::Serialize;

use crate::model::{Activity, TaxpayerRecord};

/// What a boundary layer (HTTP handler, CLI) emits for one lookup.
///
/// Failures collapse into [`TaxpayerResponse::Degraded`], which carries no
/// hint of the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaxpayerResponse {
    Found(TaxpayerRecord),
    Degraded {
        name: String,
        activities: Vec<Activity>,
    },
}

impl TaxpayerResponse {
    pub fn degraded() -> Self {
        Self::Degraded {
            name: String::new(),
            activities: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Build a response from a lookup outcome, discarding the error.
    pub fn from_result<E>(result: Result<TaxpayerRecord, E>) -> Self {
        match result {
            Ok(record) => Self::Found(record),
            Err(_) => Self::degraded(),
        }
    }
}

impl From<TaxpayerRecord> for TaxpayerResponse {
    fn from(record: TaxpayerRecord) -> Self {
        Self::Found(record)
    }
}
