//! Builders for the site's page fragments: search header, recipe cards,
//! lazy images, and the CSRF meta tag. Each returns the node ids the widgets
//! attach to.

use crate::dom::{Document, NodeId};
use crate::favorite::{CSRF_META_NAME, FAVORITE_CLASS};
use crate::images::LAZY_IMAGE_ATTR;
use crate::suggest::{FORM_ATTR, INPUT_ATTR, PANEL_ATTR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHeader {
    pub container: NodeId,
    pub form: NodeId,
    pub input: NodeId,
    pub panel: NodeId,
}

/// `<div class="search"><form data-search-form><input data-search-input></form>
/// <div data-search-suggestions></div></div>`
pub fn search_header(doc: &mut Document, parent: NodeId) -> SearchHeader {
    let container = doc.append_element(parent, "div");
    doc.add_class(container, "search");

    let form = doc.append_element(container, "form");
    doc.set_attribute(form, FORM_ATTR, "");
    doc.set_attribute(form, "action", "/search");
    doc.set_attribute(form, "method", "get");

    let input = doc.append_element(form, "input");
    doc.set_attribute(input, INPUT_ATTR, "");
    doc.set_attribute(input, "type", "search");
    doc.set_attribute(input, "name", "q");
    doc.set_attribute(input, "autocomplete", "off");

    let panel = doc.append_element(container, "div");
    doc.set_attribute(panel, PANEL_ATTR, "");
    doc.add_class(panel, "search-suggestions");

    SearchHeader { container, form, input, panel }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeCard {
    pub card: NodeId,
    pub image: NodeId,
    pub title: NodeId,
    pub favorite: NodeId,
}

/// A recipe card with a lazy cover image and a favorite toggle.
pub fn recipe_card(
    doc: &mut Document,
    parent: NodeId,
    recipe_id: &str,
    title: &str,
    liked: bool,
) -> RecipeCard {
    let card = doc.append_element(parent, "article");
    doc.add_class(card, "recipe-card");

    let image = lazy_image(doc, card, &format!("/static/images/{recipe_id}.jpg"));

    let heading = doc.append_element(card, "h3");
    let title_link = doc.append_element(heading, "a");
    doc.set_attribute(title_link, "href", &format!("/recipe/{recipe_id}"));
    doc.set_text_content(title_link, title);

    let flag = if liked { "true" } else { "false" };
    let favorite = doc.append_element(card, "button");
    doc.add_class(favorite, FAVORITE_CLASS);
    if liked {
        doc.add_class(favorite, crate::favorite::LIKED_CLASS);
    }
    doc.set_attribute(favorite, "type", "button");
    doc.set_data(favorite, "recipe-id", recipe_id);
    doc.set_data(favorite, "liked", flag);
    doc.set_attribute(favorite, "aria-pressed", flag);
    let icon = doc.append_element(favorite, "span");
    doc.add_class(icon, "recipe-card__heart");

    RecipeCard { card, image, title: title_link, favorite }
}

pub fn lazy_image(doc: &mut Document, parent: NodeId, src: &str) -> NodeId {
    let img = doc.append_element(parent, "img");
    doc.set_attribute(img, LAZY_IMAGE_ATTR, "");
    doc.set_attribute(img, "loading", "lazy");
    doc.set_attribute(img, "src", src);
    img
}

/// `<meta name="csrf-token" content="...">` under `parent`.
pub fn csrf_meta(doc: &mut Document, parent: NodeId, token: &str) -> NodeId {
    let meta = doc.append_element(parent, "meta");
    doc.set_attribute(meta, "name", CSRF_META_NAME);
    doc.set_attribute(meta, "content", token);
    meta
}
