//! Favorite toggle buttons on recipe cards.
//!
//! A click flips the button between liked and unliked by calling the favorite
//! endpoint (`POST` to like, `DELETE` to unlike). The button only changes once
//! the server confirms the new state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::WidgetConfig;
use crate::dom::{Document, NodeId, SharedDocument};
use crate::transport::Transport;
use crate::types::{FavoriteResponse, HttpRequest, Method};

pub const FAVORITE_CLASS: &str = "recipe-card__favorite";
pub const LIKED_CLASS: &str = "is-liked";
pub const CSRF_META_NAME: &str = "csrf-token";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// What a toggle did to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FavoriteOutcome {
    /// Button has no recipe id; nothing was sent.
    Skipped,
    /// Server confirmed the new state and the button now shows it.
    Updated { liked: bool },
    /// Server asked for login; the window navigated to `url`.
    Redirected { url: String },
    /// Request failed or the reply carried no usable state.
    Unchanged,
}

pub struct FavoriteController<T: Transport> {
    doc: SharedDocument,
    transport: Arc<T>,
    config: Arc<WidgetConfig>,
    buttons: Vec<NodeId>,
    csrf_token: String,
}

impl<T: Transport> FavoriteController<T> {
    /// Collect the page's favorite buttons and its CSRF token.
    pub fn attach(doc: SharedDocument, transport: Arc<T>, config: Arc<WidgetConfig>) -> Self {
        let (buttons, csrf_token) = {
            let d = doc.lock();
            (
                d.query_all_by_class(d.root(), FAVORITE_CLASS),
                d.meta_content(CSRF_META_NAME).unwrap_or_default(),
            )
        };
        debug!(buttons = buttons.len(), csrf = !csrf_token.is_empty(), "Bound favorite buttons");
        Self { doc, transport, config, buttons, csrf_token }
    }

    /// The bound button that is `target` or contains it.
    pub fn button_for(&self, target: NodeId) -> Option<NodeId> {
        let doc = self.doc.lock();
        self.buttons.iter().copied().find(|b| doc.contains(*b, target))
    }

    pub fn request_for(&self, recipe_id: &str, currently_liked: bool) -> HttpRequest {
        let method = if currently_liked { Method::Delete } else { Method::Post };
        let mut request = HttpRequest::new(method, self.config.favorite_url(recipe_id))
            .with_header("Content-Type", "application/json");
        if !self.csrf_token.is_empty() {
            request = request.with_header(CSRF_HEADER, &self.csrf_token);
        }
        request
    }

    pub async fn toggle(&self, button: NodeId) -> FavoriteOutcome {
        let (recipe_id, liked) = {
            let doc = self.doc.lock();
            let recipe_id = doc.data(button, "recipe-id").unwrap_or_default().to_string();
            (recipe_id, doc.data(button, "liked") == Some("true"))
        };
        if recipe_id.is_empty() {
            return FavoriteOutcome::Skipped;
        }

        let request = self.request_for(&recipe_id, liked);
        let method = request.method;
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(recipe_id = recipe_id.as_str(), error = %e, "Failed to like recipe");
                return FavoriteOutcome::Unchanged;
            }
        };
        let reply = FavoriteResponse::from_body(&response.body);

        if response.status == 401 {
            let url = reply.redirect.unwrap_or_else(|| self.config.login_path.clone());
            debug!(recipe_id = recipe_id.as_str(), url = url.as_str(), "Login required");
            self.doc.lock().navigate(&url);
            return FavoriteOutcome::Redirected { url };
        }

        match (response.is_success(), reply.liked) {
            (true, Some(now_liked)) => {
                apply_liked(&mut self.doc.lock(), button, now_liked);
                debug!(recipe_id = recipe_id.as_str(), %method, liked = now_liked, "Favorite updated");
                FavoriteOutcome::Updated { liked: now_liked }
            }
            _ => {
                warn!(
                    recipe_id = recipe_id.as_str(),
                    status = response.status,
                    "Favorite reply carried no state"
                );
                FavoriteOutcome::Unchanged
            }
        }
    }
}

/// Reflect a liked state on the button: class, dataset flag, and `aria-pressed`.
pub fn apply_liked(doc: &mut Document, button: NodeId, liked: bool) {
    let flag = if liked { "true" } else { "false" };
    if liked {
        doc.add_class(button, LIKED_CLASS);
    } else {
        doc.remove_class(button, LIKED_CLASS);
    }
    doc.set_data(button, "liked", flag);
    doc.set_attribute(button, "aria-pressed", flag);
}
