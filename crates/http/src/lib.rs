//! reqwest-backed [`Transport`] for talking to a live recipebox site.
//!
//! Requests carry paths relative to the site origin; the transport joins them
//! onto the configured `base_url`. Status codes are passed through untouched,
//! so the widgets decide what counts as failure.

use recipebox_core::{
    HttpRequest, HttpResponse, Method, Result, Transport, WidgetConfig, WidgetError,
};
use tracing::debug;

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &WidgetConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(WidgetError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("recipebox/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| WidgetError::Transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a site-relative path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.path);
        let mut builder = self.client.request(reqwest_method(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = %request.method, url = url.as_str(), "Sending request");
        let response = builder.send().await.map_err(|e| WidgetError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| WidgetError::Transport(e.to_string()))?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
