//! Taxpayer data returned by the SII lookup.

use serde::{Deserialize, Serialize};

/// One registered economic activity.
///
/// Serialised with the field names the SII page uses for its table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "activities")]
    pub description: String,
    #[serde(rename = "codigo")]
    pub code: i64,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "afecta")]
    pub taxable: bool,
    /// Registration date exactly as printed on the page.
    #[serde(rename = "fecha")]
    pub date: String,
}

/// The result of a successful lookup.
///
/// `rut` carries the RUT body only, without the check digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerRecord {
    pub rut: String,
    pub name: String,
    pub activities: Vec<Activity>,
}
