//! A loaded page: the shared document plus the three widgets, with event
//! routing that mirrors where the browser would deliver each event.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::dom::{Document, NodeId, SharedDocument};
use crate::events::{DomEvent, EventKind};
use crate::favorite::{FavoriteController, FavoriteOutcome};
use crate::images::ImageLoader;
use crate::suggest::SuggestionController;
use crate::transport::Transport;

pub struct Page<T: Transport> {
    doc: SharedDocument,
    images: Mutex<ImageLoader>,
    favorites: Arc<FavoriteController<T>>,
    search: SuggestionController<T>,
    favorite_tasks: Mutex<Vec<JoinHandle<FavoriteOutcome>>>,
}

impl<T: Transport> Page<T> {
    /// Boot the widgets in script order: images, favorites, search.
    pub fn load(document: Document, transport: T, config: WidgetConfig) -> Self {
        let doc = document.into_shared();
        let transport = Arc::new(transport);
        let config = Arc::new(config);

        let images = ImageLoader::attach(&mut doc.lock());
        let favorites = FavoriteController::attach(
            Arc::clone(&doc),
            Arc::clone(&transport),
            Arc::clone(&config),
        );
        let search = SuggestionController::attach(Arc::clone(&doc), transport, config);

        Self {
            doc,
            images: Mutex::new(images),
            favorites: Arc::new(favorites),
            search,
            favorite_tasks: Mutex::new(Vec::new()),
        }
    }

    /// Run a closure against the document.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut *self.doc.lock())
    }

    pub fn search(&self) -> &SuggestionController<T> {
        &self.search
    }

    /// Bind search forms inserted after load.
    pub fn rescan(&self) -> usize {
        self.search.rescan()
    }

    /// Deliver one event. Network work is spawned; use [`Page::settle`] to wait.
    pub fn dispatch(&self, event: DomEvent) {
        match event.kind {
            EventKind::Input | EventKind::Focus => {
                if let Some(binding) = self.search.binding_for_input(event.target) {
                    self.search.trigger_query(&binding);
                }
            }
            EventKind::Click | EventKind::PointerDown => {
                if event.kind == EventKind::Click {
                    if let Some(button) = self.favorites.button_for(event.target) {
                        // Handled at the button; never reaches the document listener.
                        let favorites = Arc::clone(&self.favorites);
                        let task = tokio::spawn(async move { favorites.toggle(button).await });
                        let mut tasks = self.favorite_tasks.lock();
                        tasks.retain(|t| !t.is_finished());
                        tasks.push(task);
                        return;
                    }
                }
                let dismissed = self.search.handle_outside_dismissal(event.target);
                if dismissed > 0 {
                    debug!(dismissed, "Dismissed suggestion panels");
                }
            }
            EventKind::Load | EventKind::Error => {
                let mut doc = self.doc.lock();
                self.images.lock().handle(&mut doc, &event);
            }
        }
    }

    /// Set the field's value and fire `input`, like a keystroke.
    pub fn type_into(&self, input: NodeId, text: &str) {
        self.doc.lock().set_value(input, text);
        self.dispatch(DomEvent::input(input));
    }

    pub fn focus(&self, node: NodeId) {
        self.dispatch(DomEvent::focus(node));
    }

    pub fn click(&self, node: NodeId) {
        self.dispatch(DomEvent::click(node));
    }

    /// Click a favorite button and wait for the outcome. `None` when `node`
    /// is not (inside) a bound favorite button.
    pub async fn toggle_favorite(&self, node: NodeId) -> Option<FavoriteOutcome> {
        let button = self.favorites.button_for(node)?;
        Some(self.favorites.toggle(button).await)
    }

    /// Wait for every pending timer, search request and favorite toggle.
    /// Returns the outcomes of favorite toggles started by `dispatch`.
    pub async fn settle(&self) -> Vec<FavoriteOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let tasks = std::mem::take(&mut *self.favorite_tasks.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Ok(outcome) = task.await {
                    outcomes.push(outcome);
                }
            }
        }
        self.search.settle().await;
        outcomes
    }
}

impl<T: Transport> Drop for Page<T> {
    fn drop(&mut self) {
        for task in self.favorite_tasks.lock().drain(..) {
            task.abort();
        }
    }
}
