use crate::classify::Classification;
use crate::classify::Lookup;
use crate::classify::LookupHint;
use crate::classify::classify;
use crate::error::ImdsError;
use crate::error::Result;
use crate::node::LeafValue;
use crate::node::Node;
use crate::path::ImdsPath;
use crate::path::Namespace;
use crate::recovery::RecoveryPolicy;
use crate::transport::MetadataTransport;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

/// Breadth-first materializer for metadata trees.
///
/// Fetches are issued one at a time: each listing decides what gets queued
/// next, and demotion relies on seeing failures in queue order.
pub struct TreeCrawler<T: ?Sized> {
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for TreeCrawler<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> TreeCrawler<T>
where
    T: MetadataTransport + ?Sized,
{
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Crawls everything below `root`. An empty root crawls all three
    /// namespaces.
    ///
    /// Missing paths never fail the crawl; they are left out of the tree.
    /// Only an unreachable service (or another non path-scoped error) is
    /// returned.
    pub async fn crawl(&self, root: &str) -> Result<Node> {
        self.crawl_until(root, &CancellationToken::new()).await
    }

    /// [`TreeCrawler::crawl`] that stops with [`ImdsError::Cancelled`] once
    /// `cancel` fires. Checked before every fetch.
    pub async fn crawl_until(&self, root: &str, cancel: &CancellationToken) -> Result<Node> {
        let mut queue = seed_lookups(root)?;
        let mut recovery = RecoveryPolicy::new();
        let mut expanded: HashSet<ImdsPath> = HashSet::new();
        let mut tree = Node::new();
        let mut fetches = 0usize;

        while let Some(lookup) = queue.pop_front() {
            if cancel.is_cancelled() {
                return Err(ImdsError::Cancelled);
            }
            if lookup.hint != LookupHint::Terminal && expanded.contains(&lookup.path) {
                trace!(path = %lookup.path, "skipping already expanded directory");
                continue;
            }

            fetches += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ImdsError::Cancelled),
                fetched = self.transport.fetch(&lookup.path) => fetched,
            };
            let classification = match fetched {
                Ok(body) => classify(&lookup, &body),
                Err(err) if err.is_recoverable() => {
                    debug!(path = %lookup.path, error = %err, "metadata fetch failed");
                    Classification::Unknown
                }
                Err(err) => return Err(err),
            };

            match classification {
                Classification::Unknown => {
                    if let Some(demoted) = recovery.on_failure(&lookup.path) {
                        queue.push_back(demoted);
                    }
                }
                Classification::Terminal(value) => store(&mut tree, &lookup.path, value),
                Classification::Directory(children) => {
                    if expanded.insert(lookup.path.clone()) {
                        trace!(path = %lookup.path, children = children.len(), "expanding directory");
                        queue.extend(children);
                    }
                }
            }
        }

        debug!(
            root,
            fetches,
            failed = recovery.failed_count(),
            "metadata crawl finished"
        );
        Ok(tree)
    }
}

fn seed_lookups(root: &str) -> Result<VecDeque<Lookup>> {
    let root = root.trim().trim_matches('/');
    if root.is_empty() {
        return Ok(Namespace::ALL
            .into_iter()
            .map(|namespace| Lookup::directory(ImdsPath::root(namespace)))
            .collect());
    }
    let path = ImdsPath::parse(root)?;
    Ok(VecDeque::from([Lookup::new(path, LookupHint::Unknown)]))
}

fn store(tree: &mut Node, path: &ImdsPath, value: LeafValue) {
    if path.namespace() == Namespace::UserData {
        tree.insert(Namespace::UserData.as_str(), value);
    } else {
        tree.insert_at(&path.tree_keys(), value);
    }
}
