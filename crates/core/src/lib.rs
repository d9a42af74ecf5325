//! recipebox-core: page widgets for the recipebox site.
//!
//! The page is an in-memory [`dom::Document`]; widgets attach to the elements
//! they recognize when a [`page::Page`] loads and react to the events the
//! page dispatches. Network access goes through the [`transport::Transport`]
//! seam.
//!
//! # Modules
//!
//! - [`dom`] - Arena document: elements, classes, dataset, queries, HTML output
//! - [`events`] - DOM event kinds delivered to the page
//! - [`suggest`] - Debounced search suggestions with stale-response guard
//! - [`favorite`] - Like/unlike toggle buttons on recipe cards
//! - [`images`] - `is-loaded` / `is-error` classes for lazy images
//! - [`page`] - Widget boot order and event routing
//! - [`markup`] - Builders for the site's page fragments
//! - [`config`] - `recipebox.toml` loading
//! - [`types`] - HTTP records and endpoint payloads
//! - [`transport`] - Request/response seam
//! - [`error`] - Error taxonomy

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod favorite;
pub mod images;
pub mod markup;
pub mod page;
pub mod suggest;
pub mod transport;
pub mod types;

pub use config::{load_widget_config, WidgetConfig};
pub use dom::{Document, NodeId, SharedDocument};
pub use error::{Result, WidgetError};
pub use events::{DomEvent, EventKind};
pub use favorite::FavoriteOutcome;
pub use page::Page;
pub use transport::Transport;
pub use types::{HttpRequest, HttpResponse, Method, SuggestionItem};
