// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Lifetime of a signed display URL. Signed URLs are regenerated on every
/// render and never stored alongside the photo row.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    pub upsert: bool,
    pub cache_control: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object already exists: {0}/{1}")]
    AlreadyExists(String, String),

    #[error("Bucket already exists: {0}")]
    BucketAlreadyExists(String),

    #[error("Content type {0} is not allowed in bucket {1}")]
    ContentTypeNotAllowed(String, String),
}

/// Object storage collaborator. Production deployments implement this
/// against their provider; `MemoryStore` backs development and tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StorageError>;

    /// Build a URL that grants read access for `ttl_secs` seconds. Signing
    /// does not require the object to exist yet.
    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl_secs: u64,
    ) -> Result<String, StorageError>;

    fn get_public_url(&self, bucket: &str, path: &str) -> String;

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    async fn create_bucket(
        &self,
        name: &str,
        public: bool,
        allowed_mime_types: &[String],
    ) -> Result<(), StorageError>;
}

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

struct Bucket {
    public: bool,
    allowed_mime_types: Vec<String>,
    objects: HashMap<String, StoredObject>,
}

/// In-process object store. Holds bytes in memory and issues opaque signed
/// tokens; enough for development and for exercising the boundary in tests.
pub struct MemoryStore {
    base_url: String,
    buckets: RwLock<HashMap<String, Bucket>>,
    token_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buckets: RwLock::new(HashMap::new()),
            token_seq: AtomicU64::new(1),
        }
    }

    fn next_token(&self) -> String {
        let seq = self.token_seq.fetch_add(1, Ordering::Relaxed);
        hex::encode(seq.to_be_bytes())
    }

    /// Whether a bucket serves unauthenticated reads.
    pub async fn bucket_is_public(&self, name: &str) -> bool {
        let buckets = self.buckets.read().await;
        buckets.get(name).map(|b| b.public).unwrap_or(false)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        if !entry.allowed_mime_types.is_empty()
            && !entry.allowed_mime_types.iter().any(|m| m == &options.content_type)
        {
            return Err(StorageError::ContentTypeNotAllowed(
                options.content_type.clone(),
                bucket.to_string(),
            ));
        }

        if !options.upsert && entry.objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(
                bucket.to_string(),
                path.to_string(),
            ));
        }

        entry.objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: options.content_type.clone(),
            },
        );
        Ok(())
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl_secs: u64,
    ) -> Result<String, StorageError> {
        let expires = Utc::now().timestamp() + ttl_secs as i64;
        Ok(format!(
            "{}/object/sign/{}/{}?token={}&expires={}",
            self.base_url,
            bucket,
            path,
            self.next_token(),
            expires
        ))
    }

    fn get_public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, bucket, path)
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let buckets = self.buckets.read().await;
        let mut names: Vec<String> = buckets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_bucket(
        &self,
        name: &str,
        public: bool,
        allowed_mime_types: &[String],
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(name) {
            return Err(StorageError::BucketAlreadyExists(name.to_string()));
        }
        buckets.insert(
            name.to_string(),
            Bucket {
                public,
                allowed_mime_types: allowed_mime_types.to_vec(),
                objects: HashMap::new(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_upload() -> UploadOptions {
        UploadOptions {
            content_type: "image/png".to_string(),
            upsert: false,
            cache_control: None,
        }
    }

    #[tokio::test]
    async fn upload_requires_existing_bucket() {
        let store = MemoryStore::new("http://storage.test");
        let err = store
            .upload("bird-photos", "u1/robin.png", vec![1, 2, 3], &png_upload())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BucketNotFound(_)));
    }

    #[tokio::test]
    async fn upload_without_upsert_rejects_overwrite() {
        let store = MemoryStore::new("http://storage.test");
        store.create_bucket("bird-photos", true, &[]).await.unwrap();
        store
            .upload("bird-photos", "u1/robin.png", vec![1], &png_upload())
            .await
            .unwrap();
        let err = store
            .upload("bird-photos", "u1/robin.png", vec![2], &png_upload())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_, _)));

        let mut upsert = png_upload();
        upsert.upsert = true;
        store
            .upload("bird-photos", "u1/robin.png", vec![2], &upsert)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mime_allowlist_is_enforced() {
        let store = MemoryStore::new("http://storage.test");
        store
            .create_bucket("bird-photos", true, &["image/jpeg".to_string()])
            .await
            .unwrap();
        let err = store
            .upload("bird-photos", "u1/robin.png", vec![1], &png_upload())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ContentTypeNotAllowed(_, _)));
    }

    #[tokio::test]
    async fn signed_urls_differ_per_render() {
        let store = MemoryStore::new("http://storage.test/");
        let a = store
            .create_signed_url("bird-photos", "u1/robin.png", SIGNED_URL_TTL_SECS)
            .await
            .unwrap();
        let b = store
            .create_signed_url("bird-photos", "u1/robin.png", SIGNED_URL_TTL_SECS)
            .await
            .unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("http://storage.test/object/sign/bird-photos/"));
    }

    #[tokio::test]
    async fn public_url_is_deterministic() {
        let store = MemoryStore::new("http://storage.test");
        assert_eq!(
            store.get_public_url("bird-photos", "u1/robin.png"),
            "http://storage.test/object/public/bird-photos/u1/robin.png"
        );
    }

    #[tokio::test]
    async fn bucket_visibility_is_recorded() {
        let store = MemoryStore::new("http://storage.test");
        store.create_bucket("bird-photos", false, &[]).await.unwrap();
        assert!(!store.bucket_is_public("bird-photos").await);
        assert!(!store.bucket_is_public("missing").await);
    }
}
