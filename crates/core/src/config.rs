//! Widget configuration, loaded from `recipebox.toml` or defaults.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, WidgetError};

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "recipebox.toml";

/// Known keys in `recipebox.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "base_url",
    "search_path",
    "search_limit",
    "debounce_ms",
    "recipe_path_prefix",
    "favorite_path",
    "login_path",
    "fallback_title",
    "timeout_ms",
];

/// Runtime configuration shared by all widgets on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetConfig {
    /// Site origin used by HTTP transports, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    pub search_path: String,
    /// `limit` query parameter sent with every search.
    pub search_limit: usize,
    /// Quiet window before a search fires.
    pub debounce_ms: u64,
    /// Suggestion rows link to `<prefix><id>`.
    pub recipe_path_prefix: String,
    /// Favorite endpoint; `{id}` is replaced with the recipe id.
    pub favorite_path: String,
    /// Navigation target on 401 when the reply carries no redirect.
    pub login_path: String,
    /// Row label for suggestions without a title.
    pub fallback_title: String,
    /// Request timeout for HTTP transports. None = transport default.
    pub timeout_ms: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            search_path: "/api/search".to_string(),
            search_limit: 6,
            debounce_ms: 200,
            recipe_path_prefix: "/recipe/".to_string(),
            favorite_path: "/api/recipes/{id}/favorite".to_string(),
            login_path: "/login".to_string(),
            fallback_title: "Recipe".to_string(),
            timeout_ms: None,
        }
    }
}

impl WidgetConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// `/api/search?q=<encoded>&limit=<n>` for an already-trimmed query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&limit={}",
            self.search_path,
            crate::suggest::encode_uri_component(query),
            self.search_limit
        )
    }

    pub fn recipe_href(&self, id: &str) -> String {
        format!("{}{}", self.recipe_path_prefix, id)
    }

    pub fn favorite_url(&self, recipe_id: &str) -> String {
        self.favorite_path.replace("{id}", recipe_id)
    }

    /// Apply overrides from a parsed TOML table. Unknown keys and values of the
    /// wrong type are warned about and ignored.
    pub fn apply_table(&mut self, table: &toml::Table) {
        for (key, value) in table {
            let applied = match key.as_str() {
                "base_url" => set_string(&mut self.base_url, value),
                "search_path" => set_string(&mut self.search_path, value),
                "recipe_path_prefix" => set_string(&mut self.recipe_path_prefix, value),
                "favorite_path" => set_string(&mut self.favorite_path, value),
                "login_path" => set_string(&mut self.login_path, value),
                "fallback_title" => set_string(&mut self.fallback_title, value),
                "search_limit" => match value.as_integer() {
                    Some(n) if n > 0 => {
                        self.search_limit = n as usize;
                        true
                    }
                    _ => false,
                },
                "debounce_ms" => match value.as_integer() {
                    Some(n) if n >= 0 => {
                        self.debounce_ms = n as u64;
                        true
                    }
                    _ => false,
                },
                "timeout_ms" => match value.as_integer() {
                    Some(0) => {
                        self.timeout_ms = None;
                        true
                    }
                    Some(n) if n > 0 => {
                        self.timeout_ms = Some(n as u64);
                        true
                    }
                    _ => false,
                },
                _ => {
                    warn_unknown_key(key);
                    continue;
                }
            };
            if !applied {
                warn!(key = key.as_str(), value = %value, "Ignoring config value of the wrong type");
            }
        }
    }
}

fn set_string(slot: &mut String, value: &toml::Value) -> bool {
    match value.as_str() {
        Some(s) => {
            *slot = s.to_string();
            true
        }
        None => false,
    }
}

fn warn_unknown_key(key: &str) {
    let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
    match suggestion {
        Some(s) if edit_distance(key, s) <= 3 => {
            warn!(key, suggestion = *s, "Unknown key in {CONFIG_FILE_NAME}, did you mean '{s}'?");
        }
        _ => warn!(key, "Unknown key in {CONFIG_FILE_NAME}"),
    }
}

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Load widget configuration from a TOML file.
///
/// A missing file yields defaults. A file that exists but cannot be read or
/// parsed is an error, so a broken config never silently falls back.
pub fn load_widget_config(path: &Path) -> Result<WidgetConfig> {
    let mut config = WidgetConfig::default();
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)?;
    let table = content.parse::<toml::Table>().map_err(|e| WidgetError::Config {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    config.apply_table(&table);
    debug!(path = %path.display(), "Loaded widget config");
    Ok(config)
}
