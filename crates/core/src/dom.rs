//! In-memory page document: an arena of element and text nodes.
//!
//! Nodes are addressed by [`NodeId`] and never freed; detaching a node only
//! clears its parent link. Classes are kept as an ordered list so that the
//! serialized `class` attribute is stable across add/remove cycles.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Document shared between the page and its widget tasks.
pub type SharedDocument = Arc<Mutex<Document>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    /// Live form value (`input.value`), separate from the `value` attribute.
    value: String,
    /// Image decode state (`img.complete`).
    complete: bool,
}

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &["img", "input", "meta", "link", "br", "hr"];

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    location: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node { parent: None, children: Vec::new(), kind: NodeKind::Document }],
            root: NodeId(0),
            location: None,
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// The document node. Everything reachable from it is "in the page".
    pub fn root(&self) -> NodeId {
        self.root
    }

    // -----------------------------------------------------------------------
    // Tree construction
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Element { tag: tag.to_ascii_lowercase(), ..Element::default() };
        self.push(NodeKind::Element(element))
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Move `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Remove every child of `node` (`innerHTML = ""`).
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent: None, children: Vec::new(), kind });
        id
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Element children only, in order.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node).iter().copied().filter(|c| self.is_element(*c)).collect()
    }

    /// Inclusive containment, matching `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether the node is attached to the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Descendants of `scope` in document order, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All element descendants of `scope` carrying attribute `name`.
    pub fn query_all_by_attr(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope).into_iter().filter(|n| self.has_attribute(*n, name)).collect()
    }

    /// First element descendant of `scope` carrying attribute `name`.
    pub fn query_by_attr(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(scope).into_iter().find(|n| self.has_attribute(*n, name))
    }

    pub fn query_all_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope).into_iter().filter(|n| self.has_class(*n, class)).collect()
    }

    /// `content` of the first `<meta name="...">` in the document.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.descendants(self.root)
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some("meta"))
            .find(|n| self.attribute(*n, "name") == Some(name))
            .and_then(|n| self.attribute(n, "content").map(str::to_string))
    }

    // -----------------------------------------------------------------------
    // Element state
    // -----------------------------------------------------------------------

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element(_))
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attrs.get(name).map(String::as_str))
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        if name == "class" {
            return self.element(node).is_some_and(|e| !e.classes.is_empty());
        }
        self.element(node).is_some_and(|e| e.attrs.contains_key(name))
    }

    /// Set an attribute. `class` replaces the class list.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
            element.classes.dedup();
            return;
        }
        element.attrs.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            if name == "class" {
                element.classes.clear();
            } else {
                element.attrs.remove(name);
            }
        }
    }

    /// Dataset read: `data("recipe-id")` reads `data-recipe-id`.
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attribute(node, &format!("data-{key}"))
    }

    pub fn set_data(&mut self, node: NodeId, key: &str, value: &str) {
        self.set_attribute(node, &format!("data-{key}"), value);
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.element(node).map(|e| e.classes.as_slice()).unwrap_or(&[])
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(|e| e.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.value = value.to_string();
        }
    }

    pub fn is_complete(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.complete)
    }

    pub fn set_complete(&mut self, node: NodeId, complete: bool) {
        if let Some(element) = self.element_mut(node) {
            element.complete = complete;
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        if let NodeKind::Text(text) = &self.nodes[node.0].kind {
            return text.clone();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| match &self.nodes[n.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        if !text.is_empty() {
            self.append_text(node, text);
        }
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Window
    // -----------------------------------------------------------------------

    /// Current navigation target, set by [`Document::navigate`].
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// `window.location.href = url`.
    pub fn navigate(&mut self, url: &str) {
        self.location = Some(url.to_string());
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize a node (outer HTML). The document node serializes its children.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize only the children of a node (inner HTML).
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => {
                for child in self.children(node) {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if !element.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape_html(&element.classes.join(" "))));
                }
                for (name, value) in &element.attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                }
                out.push('>');
                if VOID_TAGS.contains(&element.tag.as_str()) {
                    return;
                }
                for child in self.children(node) {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
