use crate::error::Result;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

const UPLOADS_DIR: &str = "uploads";

/// Persists uploaded video bytes. The object store is used when a bucket is
/// configured; the local filesystem is the unconditional fallback, so an
/// upload never fails the request because of storage.
#[derive(Clone)]
pub struct StorageService {
    bucket: Option<String>,
    region: Option<String>,
}

impl StorageService {
    pub fn new(bucket: Option<String>, region: Option<String>) -> Self {
        Self { bucket, region }
    }

    /// Returns the location token: `s3://<bucket>/<key>` or a local path.
    pub async fn store_upload(
        &self,
        quiz_id: &str,
        filename: &str,
        data: &Bytes,
        content_type: &str,
    ) -> Result<String> {
        let filename = sanitize_filename(filename);

        if let Some(bucket) = &self.bucket {
            match self
                .put_object(bucket, quiz_id, &filename, data, content_type)
                .await
            {
                Ok(location) => return Ok(location),
                Err(e) => {
                    tracing::warn!(error = ?e, "object store upload failed; saving locally");
                }
            }
        }

        self.store_local(quiz_id, &filename, data).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        quiz_id: &str,
        filename: &str,
        data: &Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        let client = aws_sdk_s3::Client::new(&sdk_config);

        let key = format!("{}/{}_{}", UPLOADS_DIR, quiz_id, filename);
        client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {}", e))?;

        Ok(format!("s3://{}/{}", bucket, key))
    }

    async fn store_local(&self, quiz_id: &str, filename: &str, data: &Bytes) -> Result<String> {
        tokio::fs::create_dir_all(UPLOADS_DIR).await?;
        let path = format!("{}/{}_{}", UPLOADS_DIR, quiz_id, filename);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

/// Upload filenames end up in storage keys and local paths; strip anything
/// that could escape the uploads directory.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}
