use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::{
    error::{BdrApiError, Result},
    DatastreamContent, FolderApi, FolderInfo, ItemUpdate, ObjectInfo, StorageApi,
};

/// Configuration for [BdrClient]
#[derive(Debug, Clone)]
pub struct BdrClientConfig {
    /// Base URL of the private items API
    pub items_url: String,

    /// Base URL of the public folder API
    pub folders_url: String,

    /// Bearer token sent to the items API
    pub token: Option<String>,

    /// Timeout for each request
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct BdrClient {
    config: BdrClientConfig,
    client: reqwest::Client,
}

impl BdrClient {
    pub fn new(config: BdrClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn items_url(&self, segments: &[&str]) -> String {
        join_url(&self.config.items_url, segments)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Joins path segments onto `base`, percent-encoding each one and keeping the
/// trailing slash the storage API expects.
fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    url.push('/');
    for segment in segments {
        url.push_str(&urlencoding::encode(segment));
        url.push('/');
    }
    url
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BdrApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl StorageApi for BdrClient {
    async fn get_object(&self, pid: &str) -> Result<Option<ObjectInfo>> {
        let url = self.items_url(&[pid]);
        debug!(%url, "fetching object");

        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check_status(response).await?.json().await?))
    }

    async fn get_datastream(&self, pid: &str, dsid: &str) -> Result<Option<Bytes>> {
        let url = self.items_url(&[pid, dsid]);
        debug!(%url, "fetching datastream");

        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check_status(response).await?.bytes().await?))
    }

    async fn update_item(&self, update: &ItemUpdate) -> Result<()> {
        let url = self.items_url(&[]);
        debug!(%url, pid = update.pid(), field = update.field(), "updating item");

        let response = self
            .authorize(self.client.put(&url))
            .form(&update.form_fields())
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    async fn put_datastream(
        &self,
        pid: &str,
        dsid: &str,
        content: DatastreamContent,
    ) -> Result<()> {
        let url = self.items_url(&[pid, dsid]);
        debug!(%url, mimetype = %content.mimetype, "replacing datastream");

        let mut request = self
            .authorize(self.client.put(&url))
            .header(CONTENT_TYPE, content.mimetype)
            .body(content.content);
        if let Some(label) = content.label {
            request = request.query(&[("label", label)]);
        }

        check_status(request.send().await?).await?;

        Ok(())
    }
}

#[async_trait]
impl FolderApi for BdrClient {
    async fn get_folder(&self, id: &str) -> Result<Option<FolderInfo>> {
        let url = join_url(&self.config.folders_url, &[id]);
        debug!(%url, "fetching folder");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}
