//! Endpoints and timeouts for talking to the SII.

use std::time::Duration;

/// Issues a captcha challenge for the taxpayer status query.
pub const SII_CAPTCHA_URL: &str = "https://zeus.sii.cl/cvc_cgi/stc/CViewCaptcha.cgi";

/// Returns the taxpayer status page ("situación tributaria de terceros").
pub const SII_LOOKUP_URL: &str = "https://zeus.sii.cl/cvc_cgi/stc/getstc";

/// Applied to each of the two requests separately.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub captcha_url: String,
    pub lookup_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            captcha_url: SII_CAPTCHA_URL.to_string(),
            lookup_url: SII_LOOKUP_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point both requests somewhere other than the SII, e.g. a mock server.
    pub fn with_endpoints(
        mut self,
        captcha_url: impl Into<String>,
        lookup_url: impl Into<String>,
    ) -> Self {
        self.captcha_url = captcha_url.into();
        self.lookup_url = lookup_url.into();
        self
    }
}
