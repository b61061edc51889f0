use crate::crawler::TreeCrawler;
use crate::error::ImdsError;
use crate::error::Result;
use crate::node::Node;
use crate::path::ImdsPath;
use crate::transport::MetadataTransport;
use futures::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_WATCH_BUFFER: usize = 10;

/// Re-crawls a path on a fixed interval and publishes changed trees.
pub struct Watcher<T: ?Sized> {
    crawler: TreeCrawler<T>,
    interval: Duration,
    capacity: usize,
}

impl<T> Watcher<T>
where
    T: MetadataTransport + ?Sized,
{
    pub fn new(crawler: TreeCrawler<T>) -> Self {
        Self {
            crawler,
            interval: DEFAULT_WATCH_INTERVAL,
            capacity: DEFAULT_WATCH_BUFFER.next_power_of_two(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Number of unread snapshots kept before the oldest is evicted, rounded
    /// up to a power of two.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1).next_power_of_two();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Starts polling `start_path` on a background task.
    ///
    /// The first crawl runs immediately. After that a snapshot is published
    /// only when it differs from the previous one. A slow reader never blocks
    /// the loop: once the buffer is full the oldest snapshot is dropped.
    /// Cancelling `cancel` or dropping the stream ends the task. Dropping the
    /// stream never cancels `cancel` itself, so other work sharing the token
    /// keeps running.
    pub fn watch(&self, start_path: &str, cancel: CancellationToken) -> Result<WatchStream> {
        let root = start_path.trim().trim_matches('/').to_string();
        if !root.is_empty() {
            ImdsPath::parse(&root)?;
        }
        let (tx, rx) = broadcast::channel(self.capacity);
        let crawler = self.crawler.clone();
        let interval = self.interval;
        let cancel = cancel.child_token();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            info!(root = %root, ?interval, "watching metadata");
            poll_loop(crawler, root, interval, tx, task_cancel).await;
        });
        Ok(WatchStream {
            inner: BroadcastStream::new(rx),
            cancel,
            task,
        })
    }
}

async fn poll_loop<T>(
    crawler: TreeCrawler<T>,
    root: String,
    interval: Duration,
    tx: broadcast::Sender<Node>,
    cancel: CancellationToken,
) where
    T: MetadataTransport + ?Sized,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous: Option<Node> = None;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let snapshot = match crawler.crawl_until(&root, &cancel).await {
            Ok(snapshot) => snapshot,
            Err(ImdsError::Cancelled) => break,
            Err(err) => {
                warn!(root = %root, error = %err, "metadata watch tick failed");
                continue;
            }
        };
        if previous.as_ref() == Some(&snapshot) {
            continue;
        }
        if tx.send(snapshot.clone()).is_err() {
            debug!(root = %root, "watch receiver dropped");
            break;
        }
        previous = Some(snapshot);
    }
    info!(root = %root, "metadata watch stopped");
}

/// Snapshots published by [`Watcher::watch`]. Ends when the watch is
/// cancelled.
pub struct WatchStream {
    inner: BroadcastStream<Node>,
    /// Child of the caller's token; only this watch is stopped through it.
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchStream {
    /// Next snapshot, or `None` once the watch has stopped.
    pub async fn recv(&mut self) -> Option<Node> {
        self.next().await
    }

    /// Stops this watch only.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for WatchStream {
    type Item = Node;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Node>> {
        loop {
            match self.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(snapshot))) => return Poll::Ready(Some(snapshot)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    debug!(skipped, "dropped stale metadata snapshots");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for WatchStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
