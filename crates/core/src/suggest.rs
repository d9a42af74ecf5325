//! Debounced search suggestions.
//!
//! Every `[data-search-form]` with a `[data-search-input]` gets a
//! [`SearchBinding`]. Input and focus events restart the binding's debounce
//! timer; when the timer fires the trimmed input value is sent to the search
//! endpoint and the result list replaces the panel contents.
//!
//! Two guarantees hold per binding:
//! - at most one debounce timer is pending (a new trigger aborts the old one)
//! - only the latest issued query renders; responses carrying an older
//!   sequence number are discarded when they complete
//!
//! Outside-click dismissal is one shared pass over all bindings, driven by the
//! page's document-level pointer events.

use std::sync::Arc;

use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, warn};

use crate::config::WidgetConfig;
use crate::dom::{Document, NodeId, SharedDocument};
use crate::error::{Result, WidgetError};
use crate::transport::Transport;
use crate::types::{parse_suggestions, HttpRequest, SuggestionItem};

pub const FORM_ATTR: &str = "data-search-form";
pub const INPUT_ATTR: &str = "data-search-input";
pub const PANEL_ATTR: &str = "data-search-suggestions";
pub const VISIBLE_CLASS: &str = "is-visible";
pub const LIST_CLASS: &str = "search-suggestions__list";
pub const ITEM_CLASS: &str = "search-suggestions__item";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Trim the way `String.prototype.trim` does: Unicode whitespace plus the
/// byte-order mark, which `char::is_whitespace` does not cover.
pub fn trim_query(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// One search form wired to its input field and (optional) suggestions panel.
pub struct SearchBinding {
    form: NodeId,
    input: NodeId,
    panel: Option<NodeId>,
    state: Mutex<BindingState>,
}

#[derive(Default)]
struct BindingState {
    /// Pending debounce timer, aborted on the next trigger.
    timer: Option<AbortHandle>,
    /// Timer and request tasks not yet awaited by `settle`.
    tasks: Vec<JoinHandle<()>>,
    /// Sequence number of the most recently issued query.
    latest_seq: u64,
}

impl SearchBinding {
    fn new(form: NodeId, input: NodeId, panel: Option<NodeId>) -> Self {
        Self { form, input, panel, state: Mutex::new(BindingState::default()) }
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn panel(&self) -> Option<NodeId> {
        self.panel
    }

    pub fn latest_seq(&self) -> u64 {
        self.state.lock().latest_seq
    }

    /// Whether a timer is scheduled and has not fired or been cancelled.
    pub fn has_pending_timer(&self) -> bool {
        self.state.lock().timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn next_seq(&self) -> u64 {
        let mut state = self.state.lock();
        state.latest_seq += 1;
        state.latest_seq
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.state.lock().latest_seq == seq
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut state = self.state.lock();
        state.tasks.retain(|t| !t.is_finished());
        state.tasks.push(task);
    }

    fn take_tasks(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.state.lock().tasks)
    }

    fn abort_all(&self) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        for task in state.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Find every bindable form: `(form, input, panel)`. Forms without an input
/// are skipped. The panel is looked up in the form's parent scope.
fn discover_bindings(doc: &Document) -> Vec<(NodeId, NodeId, Option<NodeId>)> {
    doc.query_all_by_attr(doc.root(), FORM_ATTR)
        .into_iter()
        .filter_map(|form| {
            let Some(input) = doc.query_by_attr(form, INPUT_ATTR) else {
                debug!(form = ?form, "Search form has no input, skipping");
                return None;
            };
            let panel = doc.parent(form).and_then(|scope| doc.query_by_attr(scope, PANEL_ATTR));
            Some((form, input, panel))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Controller (binding registry)
// ---------------------------------------------------------------------------

struct QueryContext<T> {
    doc: SharedDocument,
    transport: Arc<T>,
    config: Arc<WidgetConfig>,
}

impl<T> Clone for QueryContext<T> {
    fn clone(&self) -> Self {
        Self {
            doc: Arc::clone(&self.doc),
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}

/// Registry of all search bindings on a page.
pub struct SuggestionController<T: Transport> {
    ctx: QueryContext<T>,
    bindings: Mutex<Vec<Arc<SearchBinding>>>,
}

impl<T: Transport> SuggestionController<T> {
    /// Bind every search form currently in the document.
    pub fn attach(doc: SharedDocument, transport: Arc<T>, config: Arc<WidgetConfig>) -> Self {
        let controller = Self {
            ctx: QueryContext { doc, transport, config },
            bindings: Mutex::new(Vec::new()),
        };
        controller.rescan();
        controller
    }

    /// Bind forms added since the last scan. Already-bound forms are left
    /// alone. Returns the number of new bindings.
    pub fn rescan(&self) -> usize {
        let found = discover_bindings(&self.ctx.doc.lock());
        let mut bindings = self.bindings.lock();
        let mut added = 0;
        for (form, input, panel) in found {
            if bindings.iter().any(|b| b.form == form) {
                continue;
            }
            bindings.push(Arc::new(SearchBinding::new(form, input, panel)));
            added += 1;
        }
        debug!(added, total = bindings.len(), "Bound search forms");
        added
    }

    pub fn bindings(&self) -> Vec<Arc<SearchBinding>> {
        self.bindings.lock().clone()
    }

    pub fn binding_for_input(&self, input: NodeId) -> Option<Arc<SearchBinding>> {
        self.bindings.lock().iter().find(|b| b.input == input).cloned()
    }

    /// Restart the binding's debounce timer. When it fires, the input value is
    /// read, trimmed, and either rendered as empty or sent as a search.
    pub fn trigger_query(&self, binding: &Arc<SearchBinding>) {
        let ctx = self.ctx.clone();
        let fired = Arc::clone(binding);
        let delay = self.ctx.config.debounce();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire_query(ctx, fired);
        });

        let mut state = binding.state.lock();
        if let Some(previous) = state.timer.replace(task.abort_handle()) {
            previous.abort();
        }
        state.tasks.retain(|t| !t.is_finished());
        state.tasks.push(task);
    }

    /// Document-level pointer event: close every panel whose form and panel
    /// both lie outside the event target. Returns how many panels were closed.
    pub fn handle_outside_dismissal(&self, target: NodeId) -> usize {
        let bindings = self.bindings();
        let mut doc = self.ctx.doc.lock();
        let mut dismissed = 0;
        for binding in bindings {
            let Some(panel) = binding.panel else {
                continue;
            };
            if doc.contains(panel, target) || doc.contains(binding.form, target) {
                continue;
            }
            render_suggestions(&mut doc, Some(panel), &[], &self.ctx.config);
            dismissed += 1;
        }
        dismissed
    }

    /// Wait until no timer or request task is outstanding on any binding.
    pub async fn settle(&self) {
        loop {
            let tasks: Vec<JoinHandle<()>> =
                self.bindings().iter().flat_map(|b| b.take_tasks()).collect();
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                // Aborted timers resolve with a cancellation error; nothing to report.
                let _ = task.await;
            }
        }
    }
}

impl<T: Transport> Drop for SuggestionController<T> {
    fn drop(&mut self) {
        for binding in self.bindings.lock().iter() {
            binding.abort_all();
        }
    }
}

fn fire_query<T: Transport>(ctx: QueryContext<T>, binding: Arc<SearchBinding>) {
    let query = trim_query(ctx.doc.lock().value(binding.input)).to_string();
    let seq = binding.next_seq();

    if query.is_empty() {
        render_suggestions(&mut ctx.doc.lock(), binding.panel, &[], &ctx.config);
        return;
    }

    debug!(seq, query = query.as_str(), "Issuing search");
    let tracked = Arc::clone(&binding);
    let task = tokio::spawn(run_query(ctx, binding, seq, query));
    tracked.track(task);
}

async fn run_query<T: Transport>(
    ctx: QueryContext<T>,
    binding: Arc<SearchBinding>,
    seq: u64,
    query: String,
) {
    let results = match fetch_suggestions(ctx.transport.as_ref(), &ctx.config, &query).await {
        Ok(items) => items,
        Err(e @ WidgetError::Transport(_)) => {
            error!(query = query.as_str(), error = %e, "Search request failed");
            Vec::new()
        }
        Err(e) => {
            warn!(query = query.as_str(), error = %e, "Search returned no usable results");
            Vec::new()
        }
    };

    if !binding.is_latest(seq) {
        debug!(seq, latest = binding.latest_seq(), "Discarding stale suggestions");
        return;
    }
    render_suggestions(&mut ctx.doc.lock(), binding.panel, &results, &ctx.config);
}

/// `GET <search_path>?q=<query>&limit=<n>` and decode the result list.
pub async fn fetch_suggestions<T: Transport>(
    transport: &T,
    config: &WidgetConfig,
    query: &str,
) -> Result<Vec<SuggestionItem>> {
    let response = transport.send(HttpRequest::get(config.search_url(query))).await?;
    if !response.is_success() {
        return Err(WidgetError::Status(response.status));
    }
    parse_suggestions(&response.body)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Replace the panel contents with one link row per item. An empty list
/// clears and hides the panel. A missing panel is a no-op.
pub fn render_suggestions(
    doc: &mut Document,
    panel: Option<NodeId>,
    results: &[SuggestionItem],
    config: &WidgetConfig,
) {
    let Some(panel) = panel else {
        return;
    };
    doc.clear_children(panel);
    if results.is_empty() {
        doc.remove_class(panel, VISIBLE_CLASS);
        return;
    }

    let list = doc.create_element("div");
    doc.add_class(list, LIST_CLASS);
    for item in results {
        let row = doc.append_element(list, "a");
        doc.add_class(row, ITEM_CLASS);
        doc.set_attribute(row, "href", &config.recipe_href(&item.id));
        doc.set_text_content(row, item.label(&config.fallback_title));
    }
    doc.append_child(panel, list);
    doc.add_class(panel, VISIBLE_CLASS);
}

/// A suggestion row as it appears in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub href: String,
    pub label: String,
}

/// Read back the rows currently rendered in a panel.
pub fn rendered_rows(doc: &Document, panel: NodeId) -> Vec<RenderedRow> {
    doc.query_all_by_class(panel, ITEM_CLASS)
        .into_iter()
        .map(|row| RenderedRow {
            href: doc.attribute(row, "href").unwrap_or_default().to_string(),
            label: doc.text_content(row),
        })
        .collect()
}

pub fn is_panel_visible(doc: &Document, panel: NodeId) -> bool {
    doc.has_class(panel, VISIBLE_CLASS)
}
