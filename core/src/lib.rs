//! Client for the EC2 instance metadata service.
//!
//! [`TreeCrawler`] materializes a metadata path into a [`Node`] tree without
//! knowing the layout up front, [`Watcher`] re-crawls it on an interval, and
//! [`KeySearch`] resolves bare key names like `region` to full paths.

mod classify;
mod client;
pub mod config;
mod crawler;
pub mod docs;
pub mod error;
pub mod events;
mod node;
mod path;
mod recovery;
mod search;
mod similar;
pub mod transport;
mod watcher;

pub use classify::Classification;
pub use classify::Lookup;
pub use classify::LookupHint;
pub use classify::OPAQUE_BLOB_NAMES;
pub use classify::classify;
pub use classify::is_directory;
pub use classify::parse_json;
pub use client::ImdsClient;
pub use config::ImdsConfig;
pub use crawler::TreeCrawler;
pub use error::ImdsError;
pub use error::Result;
pub use node::LeafValue;
pub use node::Node;
pub use path::ImdsPath;
pub use path::Namespace;
pub use path::normalize_path;
pub use recovery::RecoveryPolicy;
pub use search::KeyIndex;
pub use search::KeySearch;
pub use search::SEARCH_NAMESPACES;
pub use search::find_key_in;
pub use similar::find_similar;
pub use similar::similarity_score;
pub use transport::HttpTransport;
pub use transport::MetadataTransport;
pub use watcher::DEFAULT_WATCH_BUFFER;
pub use watcher::DEFAULT_WATCH_INTERVAL;
pub use watcher::WatchStream;
pub use watcher::Watcher;
