use anyhow::Context as _;
use aws_sdk_s3::primitives::ByteStream;

use crate::domain::repository::ImageStorePort;
use crate::error::ApiError;

/// S3-compatible image store (AWS, MinIO, or any endpoint speaking the
/// S3 API). Objects are public-read; URLs are built from
/// `public_base_url`.
#[derive(Clone)]
pub struct S3ImageStore {
    pub client: aws_sdk_s3::Client,
    pub bucket: String,
    pub public_base_url: String,
}

impl ImageStorePort for S3ImageStore {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(anyhow::Error::from)
            .context("put image object")
            .map_err(ApiError::ImageStore)?;
        Ok(build_public_url(&self.public_base_url, &self.bucket, key))
    }

    async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let key = object_key_from_url(&self.public_base_url, &self.bucket, url)
            .ok_or_else(|| ApiError::ImageStore(anyhow::anyhow!("url not in this store: {url}")))?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(anyhow::Error::from)
            .context("delete image object")
            .map_err(ApiError::ImageStore)?;
        Ok(())
    }
}

/// Build the public URL for an object key.
///
/// Supports simple templating (`{bucket}`/`{key}` placeholders), bases
/// that already include the bucket, and plain host bases.
pub fn build_public_url(base: &str, bucket: &str, key: &str) -> String {
    let trimmed = base.trim_end_matches('/');

    if trimmed.contains("{bucket}") || trimmed.contains("{key}") {
        return trimmed.replace("{bucket}", bucket).replace("{key}", key);
    }

    if trimmed.contains(bucket) {
        format!("{trimmed}/{key}")
    } else {
        format!("{trimmed}/{bucket}/{key}")
    }
}

/// Recover the object key from a URL this store produced. Returns `None`
/// for URLs that were not minted by `build_public_url` with the same
/// configuration.
pub fn object_key_from_url<'a>(base: &str, bucket: &str, url: &'a str) -> Option<&'a str> {
    let trimmed = base.trim_end_matches('/');
    let rest = url.strip_prefix(trimmed)?.trim_start_matches('/');
    if trimmed.contains(bucket) {
        Some(rest)
    } else {
        rest.strip_prefix(bucket).map(|r| r.trim_start_matches('/'))
    }
}
