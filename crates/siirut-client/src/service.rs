//! The full lookup: normalise, solve captcha, query, extract.

use std::sync::Arc;

use siirut_core::{TaxpayerRecord, TaxpayerResponse, extract, normalize};
use tracing::{error, info};

use crate::captcha::CaptchaClient;
use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::lookup::LookupClient;
use crate::transport::{FormTransport, HttpTransport, TransportError};

/// Resolves RUTs against the SII. Holds no per-request state, so one
/// instance can serve concurrent lookups.
pub struct RutService {
    captcha: CaptchaClient,
    lookup: LookupClient,
}

impl RutService {
    /// Create a service that talks HTTP to the configured endpoints.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn FormTransport>) -> Self {
        Self {
            captcha: CaptchaClient::new(transport.clone(), config.captcha_url.clone()),
            lookup: LookupClient::new(transport, config.lookup_url.clone()),
        }
    }

    /// Fetch the legal name and economic activities registered for a RUT.
    ///
    /// Makes a single attempt; the first failing stage ends the lookup.
    pub async fn fetch_taxpayer(&self, raw_rut: &str) -> Result<TaxpayerRecord, ServiceError> {
        let rut = normalize(raw_rut)?.require_canonical_length()?;

        let challenge = self
            .captcha
            .fetch_challenge()
            .await
            .map_err(ServiceError::CaptchaFetchFailed)?;

        let check_digit = rut.check_digit().to_string();
        let document = self
            .lookup
            .submit(rut.body(), &check_digit, &challenge)
            .await?;

        let record = extract(&document, &rut)?;
        info!(
            rut = %rut,
            name = %record.name,
            activities = record.activities.len(),
            "taxpayer resolved"
        );
        Ok(record)
    }

    /// Like [`fetch_taxpayer`](Self::fetch_taxpayer), but any failure is
    /// logged and replaced by [`TaxpayerResponse::degraded`].
    pub async fn fetch_response(&self, raw_rut: &str) -> TaxpayerResponse {
        let result = self.fetch_taxpayer(raw_rut).await.inspect_err(|e| {
            error!(rut = %raw_rut, error = %e, "error fetching RUT data");
        });
        TaxpayerResponse::from_result(result)
    }
}
