//! Client side of siirut: SII captcha and lookup requests, and the
//! [`RutService`] pipeline that ties them to normalisation and extraction.

pub mod captcha;
pub mod config;
mod error;
pub mod lookup;
pub mod service;
#[cfg(test)]
mod testing;
pub mod transport;

pub use captcha::{CaptchaChallenge, CaptchaClient, CaptchaError};
pub use config::ClientConfig;
pub use error::ServiceError;
pub use lookup::LookupClient;
pub use service::RutService;
pub use transport::{FormTransport, HttpTransport, TransportError};
