//! `search` command: drives a [`SearchController`] against a running server.

use std::path::PathBuf;

use creatorscope_client::{FetchOutcome, HttpSearchBackend, SearchController, SearchState};
use creatorscope_core::{AppConfig, CanonicalInfluencer, FilterState, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pages {
    Count(u32),
    All,
}

#[derive(Debug)]
pub(crate) struct SearchOptions {
    pub api_url: String,
    pub platforms: Vec<Platform>,
    pub filters: Option<PathBuf>,
    pub pages: Pages,
    pub json: bool,
}

/// Runs the first page plus the requested follow-up pages, then prints the
/// accumulated creators.
///
/// Ctrl-C during paging cancels the in-flight request; whatever was already
/// merged is still printed.
///
/// # Errors
///
/// Returns an error if the filter preset cannot be loaded, the backend cannot
/// be built, or the first page fails.
pub(crate) async fn run_search(config: &AppConfig, options: SearchOptions) -> anyhow::Result<()> {
    let filters = match &options.filters {
        Some(path) => FilterState::load_preset(path)?,
        None => FilterState::default(),
    };
    let backend = HttpSearchBackend::new(&options.api_url, &config.user_agent)?;
    let controller = SearchController::new(backend, options.platforms, filters);

    if controller.run_search(true).await != FetchOutcome::Loaded {
        let state = controller.snapshot().await;
        anyhow::bail!(
            "search failed: {}",
            state.error.as_deref().unwrap_or("request was cancelled")
        );
    }

    tokio::select! {
        loaded = fetch_more(&controller, options.pages) => {
            tracing::debug!(pages = loaded, "follow-up pages loaded");
        }
        _ = tokio::signal::ctrl_c() => {
            controller.cancel().await;
            eprintln!("interrupted; showing results loaded so far");
        }
    }

    let state = controller.snapshot().await;
    if let Some(error) = &state.error {
        eprintln!("warning: paging stopped early: {error}");
    }

    if options.json {
        print_json(&state.results)?;
    } else {
        print_table(&state.results);
    }
    eprintln!("{}", summary_line(&state));

    Ok(())
}

async fn fetch_more(controller: &SearchController<HttpSearchBackend>, pages: Pages) -> usize {
    match pages {
        Pages::All => controller.load_all().await,
        Pages::Count(n) => {
            let mut loaded = 0;
            for _ in 1..n {
                if controller.load_more().await != FetchOutcome::Loaded {
                    break;
                }
                loaded += 1;
            }
            loaded
        }
    }
}

fn print_json(results: &[CanonicalInfluencer]) -> anyhow::Result<()> {
    for record in results {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}

fn print_table(results: &[CanonicalInfluencer]) {
    if results.is_empty() {
        println!("no creators matched");
        return;
    }

    println!(
        "{:<11}{:<28}{:>12}{:>9}  {:<4}URL",
        "PLATFORM", "USERNAME", "FOLLOWERS", "ER", "VER"
    );
    for record in results {
        println!("{}", table_row(record));
    }
}

fn table_row(record: &CanonicalInfluencer) -> String {
    let username = if record.username.chars().count() > 26 {
        format!("{}...", record.username.chars().take(23).collect::<String>())
    } else {
        record.username.clone()
    };
    format!(
        "{:<11}{:<28}{:>12.0}{:>8.2}%  {:<4}{}",
        record.platform.as_str(),
        username,
        record.followers,
        record.engagement_rate * 100.0,
        if record.is_verified { "yes" } else { "" },
        record.url.as_deref().unwrap_or("\u{2014}")
    )
}

fn summary_line(state: &SearchState) -> String {
    let more = if state.has_more { "; more available" } else { "" };
    format!(
        "{} unique creators ({} reported upstream{more})",
        state.results.len(),
        state.total
    )
}
