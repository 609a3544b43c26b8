//! Form-encoded POST transport.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

/// Charset assumed when a response does not declare one. The SII CGI pages
/// are Latin-1.
pub const FALLBACK_CHARSET: &str = "ISO-8859-1";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Send a form-encoded POST and return the response body.
///
/// The body is decoded with the charset declared in `Content-Type`, or
/// [`FALLBACK_CHARSET`] when there is none.
///
/// Dropping the returned future abandons the request.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, TransportError>;
}

/// [`FormTransport`] over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, TransportError> {
        debug!(url = %url, fields = form.len(), "posting form");
        let resp = self.client.post(url).form(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text_with_charset(FALLBACK_CHARSET).await?)
    }
}
