use crate::crawler::TreeCrawler;
use crate::error::Result;
use crate::node::LeafValue;
use crate::node::Node;
use crate::path::Namespace;
use crate::similar::find_similar;
use crate::transport::MetadataTransport;
use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tracing::debug;

/// Namespaces searched by [`KeySearch::find_key`], in priority order.
pub const SEARCH_NAMESPACES: [Namespace; 2] = [Namespace::MetaData, Namespace::Dynamic];

const INDEX_CACHE_CAPACITY: usize = 4;

/// Every key name in a tree mapped to the full paths where it occurs, in
/// traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyIndex {
    entries: BTreeMap<String, Vec<String>>,
    order: Vec<String>,
}

impl KeyIndex {
    pub fn build(tree: &Node) -> Self {
        let mut index = Self::default();
        index.collect(tree, "");
        index
    }

    fn collect(&mut self, node: &Node, prefix: &str) {
        for (key, value) in node {
            let full_path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}/{key}")
            };
            if !self.entries.contains_key(key) {
                self.order.push(key.clone());
            }
            self.entries
                .entry(key.clone())
                .or_default()
                .push(full_path.clone());
            if let LeafValue::SubTree(child) = value {
                self.collect(child, &full_path);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The occurrence of `name` with the most segments. Ties go to the first
    /// one found.
    pub fn deepest(&self, name: &str) -> Option<&str> {
        let mut best: Option<&str> = None;
        for path in self.paths(name) {
            let better = best.is_none_or(|current| depth(path) > depth(current));
            if better {
                best = Some(path);
            }
        }
        best
    }

    /// Distinct key names in discovery order.
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

fn depth(path: &str) -> usize {
    path.split('/').count()
}

/// Resolves `name` against an already crawled tree.
pub fn find_key_in(tree: &Node, name: &str) -> Option<String> {
    KeyIndex::build(tree).deepest(name).map(str::to_string)
}

/// Resolves bare key names to full paths, crawling each namespace at most once
/// until [`KeySearch::invalidate`] is called.
pub struct KeySearch<T: ?Sized> {
    crawler: TreeCrawler<T>,
    cache: Mutex<LruCache<Namespace, Arc<KeyIndex>>>,
    /// Held across a cache-filling crawl so concurrent misses crawl once.
    fill: tokio::sync::Mutex<()>,
}

impl<T> KeySearch<T>
where
    T: MetadataTransport + ?Sized,
{
    pub fn new(crawler: TreeCrawler<T>) -> Self {
        Self {
            crawler,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(INDEX_CACHE_CAPACITY)
                    .unwrap_or_else(|| unreachable!("cache capacity must be non-zero")),
            )),
            fill: tokio::sync::Mutex::new(()),
        }
    }

    /// Full path of the deepest key called `name`, looking in `meta-data`
    /// first and then `dynamic`. `None` when neither has it.
    pub async fn find_key(&self, name: &str) -> Result<Option<String>> {
        let name = name.trim().trim_matches('/');
        if name.is_empty() {
            return Ok(None);
        }
        for namespace in SEARCH_NAMESPACES {
            let index = self.index(namespace).await?;
            if let Some(path) = index.deepest(name) {
                debug!(name, path, "resolved bare key");
                return Ok(Some(path.to_string()));
            }
        }
        Ok(None)
    }

    /// Key names close to `query` across the searched namespaces.
    pub async fn suggest(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for namespace in SEARCH_NAMESPACES {
            names.extend(self.index(namespace).await?.names().iter().cloned());
        }
        Ok(find_similar(query, &names, max_results))
    }

    /// Cached index for `namespace`, crawling it on first use.
    pub async fn index(&self, namespace: Namespace) -> Result<Arc<KeyIndex>> {
        if let Some(index) = self.cached(namespace) {
            return Ok(index);
        }
        let _fill = self.fill.lock().await;
        if let Some(index) = self.cached(namespace) {
            return Ok(index);
        }
        let tree = self.crawler.crawl(namespace.as_str()).await?;
        let index = Arc::new(KeyIndex::build(&tree));
        self.lock().put(namespace, Arc::clone(&index));
        Ok(index)
    }

    /// Seeds the cache from a tree crawled elsewhere, e.g. a watch snapshot.
    pub fn prime(&self, namespace: Namespace, tree: &Node) {
        self.lock().put(namespace, Arc::new(KeyIndex::build(tree)));
    }

    /// Drops cached indexes; the next lookup crawls again.
    pub fn invalidate(&self) {
        self.lock().clear();
    }

    fn cached(&self, namespace: Namespace) -> Option<Arc<KeyIndex>> {
        self.lock().get(&namespace).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<Namespace, Arc<KeyIndex>>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
