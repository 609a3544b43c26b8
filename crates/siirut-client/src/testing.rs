//! In-process transport double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{FormTransport, TransportError};

type Call = (String, Vec<(String, String)>);

/// Answers by URL with a canned body or an HTTP status, and records calls.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: HashMap<String, Result<String, u16>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, url: &str, response: Result<String, u16>) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FormTransport for FakeTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push((
            url.to_string(),
            form.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(TransportError::Status {
                status: *status,
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                body: format!("no response for {url}"),
            }),
        }
    }
}
