//! recipebox CLI: drive the page widgets against a live site.
//!
//! Builds the same page fragments the site serves, loads them with an HTTP
//! transport, and reports what the widgets rendered.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use recipebox_core::config::CONFIG_FILE_NAME;
use recipebox_core::suggest::rendered_rows;
use recipebox_core::{load_widget_config, markup, Document, FavoriteOutcome, Page, WidgetConfig};
use recipebox_http::HttpTransport;

/// recipebox CLI: search suggestions and favorites from the terminal.
#[derive(Parser)]
#[command(name = "rbx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site origin (overrides `base_url` from the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (default: ./recipebox.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Type a query into the search box and show the suggestions panel
    Suggest {
        /// Search query
        query: String,

        /// Print the panel's rendered HTML
        #[arg(long)]
        html: bool,
    },
    /// Toggle a recipe's favorite state
    Favorite {
        /// Recipe id
        recipe_id: String,

        /// Treat the recipe as currently liked (sends an unlike)
        #[arg(long)]
        liked: bool,

        /// CSRF token to send as X-CSRFToken
        #[arg(long)]
        csrf_token: Option<String>,
    },
    /// Show the effective widget configuration
    Config,
}

fn resolve_config(path: Option<PathBuf>, base_url: Option<String>) -> WidgetConfig {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let mut config = load_widget_config(&path).unwrap_or_else(|e| {
        eprintln!("Could not load config: {e}");
        std::process::exit(1);
    });
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    debug!(path = %path.display(), base_url = config.base_url.as_str(), "Resolved config");
    config
}

fn http_transport(config: &WidgetConfig) -> HttpTransport {
    HttpTransport::new(config).unwrap_or_else(|e| {
        eprintln!("Could not create HTTP client: {e}");
        std::process::exit(1);
    })
}

/// Redirect target as a full URL; site-relative paths are joined onto the base.
fn redirect_url(base_url: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{url}", base_url.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Could not serialize output: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("recipebox=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config, cli.base_url);

    match cli.command {
        Commands::Suggest { query, html } => {
            let transport = http_transport(&config);
            let mut doc = Document::new();
            let root = doc.root();
            let header = markup::search_header(&mut doc, root);
            let page = Page::load(doc, transport, config);

            page.type_into(header.input, &query);
            page.settle().await;

            let (rows, panel_html) = page.with_document(|doc| {
                (rendered_rows(doc, header.panel), doc.inner_html(header.panel))
            });

            if cli.json {
                print_json(&rows);
            } else if html {
                println!("{panel_html}");
            } else {
                if rows.is_empty() {
                    eprintln!("No suggestions for '{}'", query.trim());
                    std::process::exit(1);
                }
                for row in &rows {
                    println!("{:<48} {}", row.label, row.href);
                }
                eprintln!("\n{} suggestions", rows.len());
            }
        }
        Commands::Favorite { recipe_id, liked, csrf_token } => {
            let base_url = config.base_url.clone();
            let transport = http_transport(&config);
            let mut doc = Document::new();
            let root = doc.root();
            if let Some(token) = &csrf_token {
                markup::csrf_meta(&mut doc, root, token);
            }
            let card = markup::recipe_card(&mut doc, root, &recipe_id, "", liked);
            let page = Page::load(doc, transport, config);

            let outcome = page.toggle_favorite(card.favorite).await.unwrap_or(FavoriteOutcome::Skipped);

            if cli.json {
                print_json(&outcome);
                if !matches!(outcome, FavoriteOutcome::Updated { .. }) {
                    std::process::exit(1);
                }
                return;
            }
            match outcome {
                FavoriteOutcome::Updated { liked: true } => println!("Recipe {recipe_id}: liked"),
                FavoriteOutcome::Updated { liked: false } => println!("Recipe {recipe_id}: not liked"),
                FavoriteOutcome::Redirected { url } => {
                    eprintln!("Login required: {}", redirect_url(&base_url, &url));
                    std::process::exit(1);
                }
                FavoriteOutcome::Unchanged => {
                    eprintln!("Favorite request for recipe {recipe_id} did not change its state");
                    std::process::exit(1);
                }
                FavoriteOutcome::Skipped => {
                    eprintln!("Missing recipe id");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            if cli.json {
                print_json(&config);
            } else {
                println!("Base URL:        {}", config.base_url);
                println!("Search:          {}?q=<query>&limit={}", config.search_path, config.search_limit);
                println!("Debounce:        {}ms", config.debounce_ms);
                println!("Recipe links:    {}<id>", config.recipe_path_prefix);
                println!("Favorite:        {}", config.favorite_path);
                println!("Login:           {}", config.login_path);
                println!("Fallback title:  {}", config.fallback_title);
                match config.timeout_ms {
                    Some(ms) => println!("Timeout:         {ms}ms"),
                    None => println!("Timeout:         none"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_url_joins_only_relative_paths() {
        assert_eq!(
            redirect_url("http://127.0.0.1:5000/", "/login?next=/recipe/5"),
            "http://127.0.0.1:5000/login?next=/recipe/5"
        );
        assert_eq!(
            redirect_url("http://127.0.0.1:5000", "https://auth.example/login"),
            "https://auth.example/login"
        );
    }
}
