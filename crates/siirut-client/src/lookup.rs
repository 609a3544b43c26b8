//! Submission of the taxpayer status query.

use std::sync::Arc;

use tracing::info;

use crate::captcha::CaptchaChallenge;
use crate::transport::{FormTransport, TransportError};

/// Program and option identifying the "situación tributaria" query.
const PROGRAM: &str = "STC";
const OPTION: &str = "NOR";

/// Fields of the lookup form, in the order the SII page submits them.
pub fn lookup_form<'a>(
    rut_body: &'a str,
    check_digit: &'a str,
    challenge: &'a CaptchaChallenge,
) -> [(&'static str, &'a str); 6] {
    [
        ("RUT", rut_body),
        ("DV", check_digit),
        ("PRG", PROGRAM),
        ("OPC", OPTION),
        ("txt_code", challenge.code.as_str()),
        ("txt_captcha", challenge.token.as_str()),
    ]
}

pub struct LookupClient {
    transport: Arc<dyn FormTransport>,
    url: String,
}

impl LookupClient {
    pub fn new(transport: Arc<dyn FormTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    /// Post the query and return the result page verbatim.
    pub async fn submit(
        &self,
        rut_body: &str,
        check_digit: &str,
        challenge: &CaptchaChallenge,
    ) -> Result<String, TransportError> {
        info!(url = %self.url, rut = %rut_body, "submitting lookup");
        let form = lookup_form(rut_body, check_digit, challenge);
        let document = self.transport.post_form(&self.url, &form).await?;
        info!(bytes = document.len(), "lookup page received");
        Ok(document)
    }
}
