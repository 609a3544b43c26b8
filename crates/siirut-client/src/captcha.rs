//! Captcha challenge for the SII status query.
//!
//! The SII hands out a base64 token whose decoded bytes carry the answer
//! at a fixed offset. The lookup form wants both that answer and the
//! token as it was received.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::transport::{FormTransport, TransportError};

/// Byte offset of the answer inside the decoded token.
pub const CAPTCHA_CODE_OFFSET: usize = 36;
/// Length in bytes of the answer.
pub const CAPTCHA_CODE_LEN: usize = 4;

const MIN_DECODED_LEN: usize = CAPTCHA_CODE_OFFSET + CAPTCHA_CODE_LEN;

#[derive(Error, Debug)]
pub enum CaptchaError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("captcha response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("captcha response has no txtCaptcha token")]
    MissingToken,
    #[error("failed to decode captcha: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("decoded captcha is too short: {len} bytes, need {min}")]
    TooShort { len: usize, min: usize },
}

/// A single-use captcha answer together with the token to echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    /// Base64 token exactly as the server sent it.
    pub token: String,
    pub code: String,
}

#[derive(Deserialize)]
struct CaptchaResponse {
    #[serde(rename = "txtCaptcha")]
    txt_captcha: Option<String>,
}

/// Decode a token and pull the answer out of it.
pub fn decode_challenge(token: String) -> Result<CaptchaChallenge, CaptchaError> {
    let decoded = STANDARD.decode(token.as_bytes())?;
    let code = captcha_code(&decoded)?;
    Ok(CaptchaChallenge { token, code })
}

/// The answer embedded in a decoded token.
pub fn captcha_code(decoded: &[u8]) -> Result<String, CaptchaError> {
    if decoded.len() < MIN_DECODED_LEN {
        return Err(CaptchaError::TooShort {
            len: decoded.len(),
            min: MIN_DECODED_LEN,
        });
    }
    let code = &decoded[CAPTCHA_CODE_OFFSET..CAPTCHA_CODE_OFFSET + CAPTCHA_CODE_LEN];
    Ok(String::from_utf8_lossy(code).into_owned())
}

pub struct CaptchaClient {
    transport: Arc<dyn FormTransport>,
    url: String,
}

impl CaptchaClient {
    pub fn new(transport: Arc<dyn FormTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    /// Request a fresh challenge. Each challenge is good for one lookup.
    pub async fn fetch_challenge(&self) -> Result<CaptchaChallenge, CaptchaError> {
        info!(url = %self.url, "requesting captcha");
        let body = self.transport.post_form(&self.url, &[("oper", "0")]).await?;
        let response: CaptchaResponse = serde_json::from_str(&body)?;
        let token = response.txt_captcha.ok_or(CaptchaError::MissingToken)?;
        decode_challenge(token)
    }
}
