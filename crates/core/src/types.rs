//! Wire types shared by the widgets and transports: HTTP request/response
//! records, search suggestion items, and the favorite endpoint's reply.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, WidgetError};

// ---------------------------------------------------------------------------
// HTTP records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the site origin, e.g. `GET /api/search?q=soup&limit=6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path plus query string, always starting with `/`.
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new() }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// 2xx, matching `Response.ok`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

// ---------------------------------------------------------------------------
// Search suggestions
// ---------------------------------------------------------------------------

/// One search hit as returned by `/api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionItem {
    pub id: String,
    pub title: Option<String>,
}

impl SuggestionItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: Some(title.into()) }
    }

    /// Display label, falling back when the title is missing or empty.
    pub fn label<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => fallback,
        }
    }

    /// Shape check for a single entry. Ids may be strings or numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get("id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let title = match obj.get("title") {
            Some(Value::String(s)) => Some(s.clone()),
            // Truthy scalars render as their text; 0 and false fall back.
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Some(Value::Bool(true)) => Some("true".to_string()),
            _ => None,
        };
        Some(Self { id, title })
    }
}

/// Decode a search response body. Anything but a JSON array is an error;
/// array entries failing the shape check are dropped.
pub fn parse_suggestions(body: &[u8]) -> Result<Vec<SuggestionItem>> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Array(entries) = value else {
        return Err(WidgetError::UnexpectedShape("expected a JSON array".to_string()));
    };
    let total = entries.len();
    let items: Vec<SuggestionItem> = entries.iter().filter_map(SuggestionItem::from_value).collect();
    if items.len() < total {
        debug!(dropped = total - items.len(), "Skipped malformed suggestion entries");
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

/// Reply from the favorite endpoint. Fields of the wrong type count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteResponse {
    pub liked: Option<bool>,
    pub redirect: Option<String>,
}

impl FavoriteResponse {
    /// Lenient decode: an unparseable body is treated as `{}`.
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            liked: value.get("liked").and_then(Value::as_bool),
            redirect: value
                .get("redirect")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}
