//! Lazy image state classes.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::events::{DomEvent, EventKind};

pub const LAZY_IMAGE_ATTR: &str = "data-lazy-image";
pub const LOADED_CLASS: &str = "is-loaded";
pub const ERROR_CLASS: &str = "is-error";

/// Tracks the one-shot `load`/`error` listeners of every lazy image.
#[derive(Debug, Default)]
pub struct ImageLoader {
    images: Vec<NodeId>,
    awaiting_load: HashSet<NodeId>,
    awaiting_error: HashSet<NodeId>,
}

impl ImageLoader {
    /// Mark already-complete images as loaded; listen on the rest.
    pub fn attach(doc: &mut Document) -> Self {
        let mut loader = Self::default();
        for img in doc.query_all_by_attr(doc.root(), LAZY_IMAGE_ATTR) {
            loader.images.push(img);
            if doc.is_complete(img) {
                doc.add_class(img, LOADED_CLASS);
            } else {
                loader.awaiting_load.insert(img);
                loader.awaiting_error.insert(img);
            }
        }
        debug!(
            images = loader.images.len(),
            pending = loader.awaiting_load.len(),
            "Bound lazy images"
        );
        loader
    }

    pub fn images(&self) -> &[NodeId] {
        &self.images
    }

    /// Returns true when the event was consumed by a listener.
    pub fn handle(&mut self, doc: &mut Document, event: &DomEvent) -> bool {
        match event.kind {
            EventKind::Load if self.awaiting_load.remove(&event.target) => {
                doc.add_class(event.target, LOADED_CLASS);
                true
            }
            EventKind::Error if self.awaiting_error.remove(&event.target) => {
                doc.add_class(event.target, ERROR_CLASS);
                true
            }
            _ => false,
        }
    }
}
