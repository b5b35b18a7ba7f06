use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::error::ResolutionFailure;
use crate::formats::{ProductRecord, ScrapedMetadata};

/// Turns a link into display metadata.
///
/// Implementations are total: every failure is folded into a fallback record and
/// the returned `url` is always exactly `link`.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, link: &str) -> ProductRecord;
}

#[derive(Debug, Clone)]
pub struct HttpMetadataResolver {
    client: reqwest::Client,
    endpoint: Url,
    placeholder_image: String,
}

impl HttpMetadataResolver {
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        placeholder_image: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build resolver http client")?;
        Ok(Self {
            client,
            endpoint,
            placeholder_image: placeholder_image.into(),
        })
    }

    pub fn request_url(&self, link: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", link);
        url
    }

    /// Transport step: any non-2xx status or undecodable body is a failure.
    pub async fn fetch(&self, link: &str) -> Result<ScrapedMetadata, ResolutionFailure> {
        let response = self
            .client
            .get(self.request_url(link))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(ResolutionFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionFailure::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(ResolutionFailure::Transport)?;
        serde_json::from_slice(&body).map_err(ResolutionFailure::Body)
    }
}

#[async_trait]
impl MetadataResolver for HttpMetadataResolver {
    async fn resolve(&self, link: &str) -> ProductRecord {
        match self.fetch(link).await {
            Ok(metadata) => metadata.into_record(link, &self.placeholder_image),
            Err(err) => {
                tracing::warn!(link, ?err, "metadata lookup failed; using fallback");
                ProductRecord::fallback(link, &self.placeholder_image)
            }
        }
    }
}
