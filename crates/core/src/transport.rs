//! Network seam between the widgets and the site's REST endpoints.

use std::future::Future;

use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse};

/// Sends one request and resolves with the raw response.
///
/// Non-success statuses are responses, not errors; only failures to obtain a
/// response at all (connection, IO, timeout) return `Err`.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}
