//! Structured log entries describing one request.
//!
//! An entry is built once from the request and never mutated. The completion
//! entry is derived from it with [`LogEntry::completed`], leaving the started
//! snapshot intact.

use std::time::Duration;

use http::StatusCode;

use crate::request::Request;
use crate::response::status_text;

/// Header whose non-empty value is recorded as `request_id`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Field set for one request's log events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    request: String,
    method: String,
    remote: String,
    request_id: Option<String>,
    completion: Option<Completion>,
}

/// Fields known only once the downstream chain has returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub status: StatusCode,
    pub took: Duration,
}

impl Completion {
    pub fn text_status(&self) -> &'static str {
        status_text(self.status)
    }
}

impl LogEntry {
    /// Captures `request`, `method`, `remote` and, when the inbound request
    /// carries a non-empty `X-Request-ID`, `request_id`.
    pub fn from_request(req: &Request) -> Self {
        // Opaque (non-ASCII) bytes still identify the request.
        let request_id = req.headers().get(REQUEST_ID_HEADER)
            .map(|v| v.as_bytes())
            .filter(|id| !id.is_empty())
            .map(|id| String::from_utf8_lossy(id).into_owned());

        Self {
            request: req.path().to_owned(),
            method: req.method().as_str().to_owned(),
            remote: req.remote_addr().to_string(),
            request_id,
            completion: None,
        }
    }

    /// A copy of this entry extended with `status`, `text_status` and `took`.
    pub fn completed(&self, status: StatusCode, took: Duration) -> Self {
        Self {
            completion: Some(Completion { status, took }),
            ..self.clone()
        }
    }

    pub fn request(&self) -> &str { &self.request }
    pub fn method(&self) -> &str { &self.method }
    pub fn remote(&self) -> &str { &self.remote }
    pub fn request_id(&self) -> Option<&str> { self.request_id.as_deref() }
    pub fn completion(&self) -> Option<&Completion> { self.completion.as_ref() }

    pub fn status(&self) -> Option<StatusCode> {
        self.completion.map(|c| c.status)
    }

    pub fn text_status(&self) -> Option<&'static str> {
        self.completion.map(|c| c.text_status())
    }

    pub fn took(&self) -> Option<Duration> {
        self.completion.map(|c| c.took)
    }

    #[cfg(test)]
    pub(crate) fn field_names(&self) -> Vec<&'static str> {
        let mut names = vec!["request", "method", "remote"];
        if self.request_id.is_some() {
            names.push("request_id");
        }
        if self.completion.is_some() {
            names.extend(["status", "text_status", "took"]);
        }
        names
    }
}
