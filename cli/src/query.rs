use crate::output;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use futures::StreamExt;
use imds_core::ImdsClient;
use imds_core::Namespace;
use imds_core::normalize_path;
use imds_core::parse_json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryOptions {
    pub recurse: bool,
    pub watch: bool,
    /// Resolve a single word that is not a namespace with a key search.
    pub bare_key_lookup: bool,
}

pub(crate) async fn run(client: &ImdsClient, path: &str, options: QueryOptions) -> Result<()> {
    let path = if options.bare_key_lookup && is_bare_key(path) {
        resolve_bare_key(client, path).await?
    } else {
        normalize_path(path)
    };

    if options.recurse {
        if options.watch {
            return watch(client, &path).await;
        }
        let tree = client
            .crawl(&path)
            .await
            .with_context(|| format!("unable to recurse starting with path `{path}`"))?;
        return output::print_json(&tree);
    }

    if path.is_empty() {
        return output::print_text(&Namespace::ALL.map(Namespace::as_str).join("\n"));
    }

    match client.get(&path).await {
        Ok(body) => match parse_json(&body) {
            Some(json) => output::print_json(&json),
            None => output::print_text(&String::from_utf8_lossy(&body)),
        },
        Err(err) if err.is_not_found() => {
            let last = path.rsplit('/').next().unwrap_or(&path);
            output::print_suggestions(&suggestions(client, last).await);
            bail!("metadata path `{path}` not found");
        }
        Err(err) => Err(err).with_context(|| format!("unable to retrieve path `{path}`")),
    }
}

fn is_bare_key(path: &str) -> bool {
    !path.is_empty() && !path.contains('/') && path.parse::<Namespace>().is_err()
}

async fn resolve_bare_key(client: &ImdsClient, name: &str) -> Result<String> {
    let found = client
        .find_key(name)
        .await
        .with_context(|| format!("unable to search for key `{name}`"))?;
    match found {
        Some(path) => {
            debug!(name, path, "resolved bare key");
            Ok(path)
        }
        None => {
            output::print_suggestions(&suggestions(client, name).await);
            bail!("no metadata key named `{name}`");
        }
    }
}

/// Best effort: a failed search just means no suggestions.
async fn suggestions(client: &ImdsClient, query: &str) -> Vec<String> {
    match client.find_similar(query).await {
        Ok(found) => found,
        Err(err) => {
            debug!(query, error = %err, "suggestion search failed");
            Vec::new()
        }
    }
}

async fn watch(client: &ImdsClient, path: &str) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let shutdown = shutdown_signal()?;
    tokio::spawn(async move {
        shutdown.await;
        debug!("shutdown signal received, stopping watch");
        on_signal.cancel();
    });

    let mut snapshots = client.watch(path, cancel)?;
    while let Some(snapshot) = snapshots.next().await {
        output::print_json(&snapshot)?;
    }
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. Both handlers are installed before this
/// returns.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::SignalKind;
    use tokio::signal::unix::signal;

    let mut terminate =
        signal(SignalKind::terminate()).context("unable to install SIGTERM handler")?;
    Ok(async move {
        tokio::select! {
            interrupted = tokio::signal::ctrl_c() => {
                if interrupted.is_err() {
                    terminate.recv().await;
                }
            }
            _ = terminate.recv() => {}
        }
    })
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}
