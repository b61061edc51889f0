use crate::config::ImdsConfig;
use crate::error::ImdsError;
use crate::error::Result;
use crate::path::ImdsPath;
use crate::path::Namespace;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::trace;
use url::Url;

pub const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Fetches raw response bodies from the metadata service.
///
/// Implementations report a missing path as [`ImdsError::NotFound`] and a
/// service that cannot be reached at all as [`ImdsError::Unreachable`].
#[async_trait]
pub trait MetadataTransport: Send + Sync + 'static {
    async fn fetch(&self, path: &ImdsPath) -> Result<Bytes>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ImdsConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim();
        Url::parse(endpoint).map_err(|source| ImdsError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ImdsError::Client)?;
        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `user-data` has no sub-paths; anything below it is ignored.
    pub fn url_for(&self, path: &ImdsPath) -> String {
        let namespace = path.namespace();
        let sub_path = path.sub_path();
        if namespace == Namespace::UserData || sub_path.is_empty() {
            format!("{}/latest/{namespace}", self.base_url)
        } else {
            format!("{}/latest/{namespace}/{sub_path}", self.base_url)
        }
    }
}

#[async_trait]
impl MetadataTransport for HttpTransport {
    async fn fetch(&self, path: &ImdsPath) -> Result<Bytes> {
        let url = self.url_for(path);
        trace!(%url, "fetching metadata");
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        let response = request.send().await.map_err(|source| {
            if source.is_connect() {
                ImdsError::Unreachable {
                    endpoint: self.base_url.clone(),
                    source,
                }
            } else {
                ImdsError::Transport {
                    path: path.to_string(),
                    source,
                }
            }
        })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ImdsError::not_found(path.to_string()));
        }
        if !status.is_success() {
            return Err(ImdsError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.bytes().await.map_err(|source| ImdsError::Transport {
            path: path.to_string(),
            source,
        })
    }
}
