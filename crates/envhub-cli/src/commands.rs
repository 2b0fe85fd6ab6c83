//! Subcommand implementations.
//!
//! Each command takes the store API and returns the text to print, so the
//! binary only wires arguments, files and stdout.

use anyhow::{Context, Result};
use envhub_store::{
    parse_dotenv, parse_dotenv_canonical, render_dotenv, BrowseScope, EnvKey, EnvStoreApi,
    HistoryEntry, WriteOutcome, WriteRequest,
};
use tracing::warn;

/// Options for `envhub push`.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub reason: Option<String>,
    /// Store a new version even when nothing changed.
    pub force: bool,
    /// Upper-case variable names and drop characters outside `A-Z0-9_`.
    pub canonical_names: bool,
}

/// Push the contents of a `.env` file.
pub async fn push<S: EnvStoreApi>(
    store: &S,
    key: &EnvKey,
    dotenv: &str,
    author: &str,
    options: &PushOptions,
) -> Result<WriteOutcome> {
    let variables = if options.canonical_names {
        parse_dotenv_canonical(dotenv)
    } else {
        parse_dotenv(dotenv)
    };
    if variables.is_empty() {
        warn!("No variables found in input; pushing an empty bundle for {}", key);
    }

    if options.force {
        let reason = options.reason.as_deref().unwrap_or_default();
        let version = store
            .push(key, &variables, author, reason)
            .await
            .with_context(|| format!("failed to push {key}"))?;
        return Ok(WriteOutcome {
            version,
            created: true,
        });
    }

    let request = WriteRequest {
        project: key.project().to_string(),
        service: key.service().to_string(),
        environment: key.environment().to_string(),
        variables: Some(variables),
        change_reason: options.reason.clone(),
    };
    store
        .write(request, author)
        .await
        .with_context(|| format!("failed to write {key}"))
}

/// Fetch a bundle and render it as `.env` text.
pub async fn pull<S: EnvStoreApi>(store: &S, key: &EnvKey, version: Option<u64>) -> Result<String> {
    let bundle = store
        .get(key, version)
        .await
        .with_context(|| format!("failed to read {key}"))?;

    if !bundle.is_fully_decrypted() {
        warn!(
            "{} v{}: {} value(s) could not be decrypted and are shown as stored tokens: {}",
            key,
            bundle.version,
            bundle.undecryptable.len(),
            bundle.undecryptable.join(", ")
        );
    }

    Ok(render_dotenv(&bundle.variables))
}

/// Version history as a text table or JSON.
pub async fn history<S: EnvStoreApi>(store: &S, key: &EnvKey, json: bool) -> Result<String> {
    let entries = store
        .list_history(key)
        .await
        .with_context(|| format!("failed to read history of {key}"))?;

    if json {
        let mut text = serde_json::to_string_pretty(&entries)?;
        text.push('\n');
        return Ok(text);
    }
    Ok(format_history(&entries))
}

fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No versions.\n".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                "v{:<5} {}  {:<16} {}\n",
                entry.version,
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                entry.created_by,
                entry.change_reason
            )
        })
        .collect()
}

/// Child names below `path`, one per line.
pub async fn browse<S: EnvStoreApi>(store: &S, path: &str) -> Result<String> {
    let scope = BrowseScope::parse(path)?;
    let children = store
        .children(&scope)
        .await
        .with_context(|| format!("failed to browse '{path}'"))?;

    Ok(children.iter().map(|name| format!("{name}\n")).collect())
}
