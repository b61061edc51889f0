use crate::config::ImdsConfig;
use crate::crawler::TreeCrawler;
use crate::error::Result;
use crate::events;
use crate::events::InstanceAction;
use crate::events::RebalanceRecommendation;
use crate::events::ScheduledEvent;
use crate::node::Node;
use crate::path::ImdsPath;
use crate::search::KeySearch;
use crate::transport::HttpTransport;
use crate::transport::MetadataTransport;
use crate::watcher::WatchStream;
use crate::watcher::Watcher;
use bytes::Bytes;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

/// One configured view of the metadata service: crawling, watching, key
/// search and instance events over a shared transport.
pub struct ImdsClient {
    config: ImdsConfig,
    crawler: TreeCrawler<dyn MetadataTransport>,
    search: KeySearch<dyn MetadataTransport>,
}

impl ImdsClient {
    pub fn new(config: ImdsConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ImdsConfig, transport: Arc<dyn MetadataTransport>) -> Self {
        let crawler = TreeCrawler::new(transport);
        let search = KeySearch::new(crawler.clone());
        Self {
            config,
            crawler,
            search,
        }
    }

    pub fn config(&self) -> &ImdsConfig {
        &self.config
    }

    /// Raw body at `path`, fetched once and not classified.
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        let path = ImdsPath::parse(path)?;
        self.transport().fetch(&path).await
    }

    pub async fn crawl(&self, path: &str) -> Result<Node> {
        self.crawler.crawl(path).await
    }

    pub async fn crawl_until(&self, path: &str, cancel: &CancellationToken) -> Result<Node> {
        self.crawler.crawl_until(path, cancel).await
    }

    /// Polls `path` at the configured interval.
    pub fn watch(&self, path: &str, cancel: CancellationToken) -> Result<WatchStream> {
        Watcher::new(self.crawler.clone())
            .with_interval(self.config.watch_interval())
            .with_capacity(self.config.watch_buffer())
            .watch(path, cancel)
    }

    pub async fn find_key(&self, name: &str) -> Result<Option<String>> {
        self.search.find_key(name).await
    }

    /// Up to `max_suggestions` key names resembling `query`.
    pub async fn find_similar(&self, query: &str) -> Result<Vec<String>> {
        self.search
            .suggest(query, self.config.max_suggestions)
            .await
    }

    pub fn search(&self) -> &KeySearch<dyn MetadataTransport> {
        &self.search
    }

    pub async fn spot_termination_time(&self) -> Result<Option<OffsetDateTime>> {
        events::spot_termination_time(self.transport()).await
    }

    pub async fn spot_instance_action(&self) -> Result<Option<InstanceAction>> {
        events::spot_instance_action(self.transport()).await
    }

    pub async fn rebalance_recommendation(&self) -> Result<Option<RebalanceRecommendation>> {
        events::rebalance_recommendation(self.transport()).await
    }

    pub async fn scheduled_maintenance(&self) -> Result<Vec<ScheduledEvent>> {
        events::scheduled_maintenance(self.transport()).await
    }

    fn transport(&self) -> &dyn MetadataTransport {
        self.crawler.transport().as_ref()
    }
}
