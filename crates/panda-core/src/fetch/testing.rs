//! In-memory [`Fetch`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Fetch, FetchError, FetchedBody};

#[derive(Default)]
pub(crate) struct StaticFetcher {
    responses: HashMap<String, Result<FetchedBody, u32>>,
    requests: Mutex<Vec<String>>,
    base: Option<String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.bytes(url, html.as_bytes())
    }

    pub fn bytes(mut self, url: &str, bytes: &[u8]) -> Self {
        let body = FetchedBody {
            status: 200,
            bytes: bytes.to_vec(),
            ..FetchedBody::default()
        };
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub fn body(mut self, url: &str, body: FetchedBody) -> Self {
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub fn status(mut self, url: &str, code: u32) -> Self {
        self.responses.insert(url.to_string(), Err(code));
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for StaticFetcher {
    fn base_url(&self) -> Option<&str> {
        self.base.as_deref()
    }

    fn get(&self, url: &str) -> Result<FetchedBody, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(code)) => Err(FetchError::Http(*code)),
            None => Err(FetchError::Http(404)),
        }
    }
}
