//! Test harness for page-level widget tests.
//!
//! Builds a page from the site's markup fragments and serves requests from a
//! scripted in-memory transport (no sockets). Run tests with paused tokio time
//! so debounce windows and response delays are deterministic.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use recipebox_core::markup::{self, RecipeCard, SearchHeader};
use recipebox_core::suggest::{is_panel_visible, rendered_rows, RenderedRow};
use recipebox_core::{
    Document, HttpRequest, HttpResponse, Method, Page, Transport, WidgetConfig, WidgetError,
};

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Reply {
    Respond { status: u16, body: String, delay: Duration },
    Fail,
}

struct Route {
    method: Method,
    prefix: String,
    reply: Reply,
}

#[derive(Default)]
struct Script {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

/// Answers requests from routes matched by method and longest path prefix.
/// Unmatched requests get a 404 with an empty body.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, prefix: &str, status: u16, body: &str) -> &Self {
        self.respond_after(method, prefix, status, body, Duration::ZERO)
    }

    pub fn respond_after(
        &self,
        method: Method,
        prefix: &str,
        status: u16,
        body: &str,
        delay: Duration,
    ) -> &Self {
        self.script.lock().routes.push(Route {
            method,
            prefix: prefix.to_string(),
            reply: Reply::Respond { status, body: body.to_string(), delay },
        });
        self
    }

    pub fn fail(&self, method: Method, prefix: &str) -> &Self {
        self.script.lock().routes.push(Route {
            method,
            prefix: prefix.to_string(),
            reply: Reply::Fail,
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().requests.clone()
    }

    pub fn request_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WidgetError> {
        let reply = {
            let mut script = self.script.lock();
            script.requests.push(request.clone());
            script
                .routes
                .iter()
                .filter(|r| r.method == request.method && request.path.starts_with(&r.prefix))
                .max_by_key(|r| r.prefix.len())
                .map(|r| r.reply.clone())
        };
        match reply {
            Some(Reply::Respond { status, body, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(HttpResponse::new(status, body))
            }
            Some(Reply::Fail) => Err(WidgetError::Transport("connection refused".to_string())),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

// ---------------------------------------------------------------------------
// Page harness
// ---------------------------------------------------------------------------

pub struct PageHarness {
    pub page: Page<ScriptedTransport>,
    pub transport: ScriptedTransport,
    pub search: SearchHeader,
    pub cards: Vec<RecipeCard>,
    /// An element outside every widget, for outside clicks.
    pub body_text: recipebox_core::NodeId,
}

pub struct PageBuilder {
    csrf_token: Option<String>,
    cards: Vec<(String, String, bool)>,
    config: WidgetConfig,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self { csrf_token: None, cards: Vec::new(), config: WidgetConfig::default() }
    }

    pub fn csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_string());
        self
    }

    pub fn card(mut self, id: &str, title: &str, liked: bool) -> Self {
        self.cards.push((id.to_string(), title.to_string(), liked));
        self
    }

    pub fn config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn load(self, transport: ScriptedTransport) -> PageHarness {
        let mut doc = Document::new();
        let root = doc.root();
        let head = doc.append_element(root, "head");
        if let Some(token) = &self.csrf_token {
            markup::csrf_meta(&mut doc, head, token);
        }
        let body = doc.append_element(root, "body");
        let search = markup::search_header(&mut doc, body);
        let main = doc.append_element(body, "main");
        let body_text = doc.append_element(main, "p");
        doc.set_text_content(body_text, "Popular this week");
        let cards = self
            .cards
            .iter()
            .map(|(id, title, liked)| markup::recipe_card(&mut doc, main, id, title, *liked))
            .collect();

        let page = Page::load(doc, transport.clone(), self.config);
        PageHarness { page, transport, search, cards, body_text }
    }
}

impl PageHarness {
    pub fn rows(&self) -> Vec<RenderedRow> {
        self.page.with_document(|doc| rendered_rows(doc, self.search.panel))
    }

    pub fn labels(&self) -> Vec<String> {
        self.rows().into_iter().map(|r| r.label).collect()
    }

    pub fn panel_visible(&self) -> bool {
        self.page.with_document(|doc| is_panel_visible(doc, self.search.panel))
    }

    pub fn panel_is_empty(&self) -> bool {
        self.page.with_document(|doc| doc.children(self.search.panel).is_empty())
    }

    pub fn type_query(&self, text: &str) {
        self.page.type_into(self.search.input, text);
    }
}

/// JSON array body for `/api/search`.
pub fn suggestions_json(items: &[(&str, &str)]) -> String {
    let values: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, title)| serde_json::json!({ "id": id, "title": title }))
        .collect();
    serde_json::Value::Array(values).to_string()
}
