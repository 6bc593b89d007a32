//! Client for the BDR storage API.
//!
//! The service only talks to the storage API through [StorageApi] and [FolderApi],
//! so request handlers can be exercised against an in-memory implementation.

mod client;
mod error;
mod types;

use async_trait::async_trait;
use bytes::Bytes;

pub use client::{BdrClient, BdrClientConfig};
pub use error::{BdrApiError, Result};
pub use folders::FolderInfo;
pub use types::{DatastreamContent, DatastreamInfo, ItemUpdate, ObjectInfo};

#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Returns `None` when the object does not exist.
    async fn get_object(&self, pid: &str) -> Result<Option<ObjectInfo>>;

    /// Returns `None` when the object has no such datastream.
    async fn get_datastream(&self, pid: &str, dsid: &str) -> Result<Option<Bytes>>;

    async fn update_item(&self, update: &ItemUpdate) -> Result<()>;

    async fn put_datastream(
        &self,
        pid: &str,
        dsid: &str,
        content: DatastreamContent,
    ) -> Result<()>;
}

#[async_trait]
pub trait FolderApi: Send + Sync {
    /// Returns `None` when the folder API has nothing usable for `id`.
    async fn get_folder(&self, id: &str) -> Result<Option<FolderInfo>>;
}
