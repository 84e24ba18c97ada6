use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::S3Config;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a remote file. `None` on any failure; the cause is logged.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Bytes>;
}

/// HTTP(S) downloads via reqwest, plus `s3://bucket/key` when an S3 client
/// is configured. Bodies larger than `max_bytes` are abandoned mid-stream.
#[derive(Clone)]
pub struct BlobClient {
    http: Client,
    s3: Option<aws_sdk_s3::Client>,
    max_bytes: usize,
}

impl BlobClient {
    pub fn new(s3: Option<aws_sdk_s3::Client>, max_bytes: usize) -> Result<Self> {
        let http = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
        Ok(Self {
            http,
            s3,
            max_bytes,
        })
    }

    /// `false` when the advertised length is already over the limit.
    fn within_limit(&self, source: &str, advertised: Option<u64>) -> bool {
        match advertised {
            Some(len) if len > self.max_bytes as u64 => {
                warn!(
                    "{source} is {len} bytes, over the {} byte limit",
                    self.max_bytes
                );
                false
            }
            _ => true,
        }
    }

    /// Appends `chunk` unless that would exceed the limit.
    fn append_chunk(&self, source: &str, body: &mut BytesMut, chunk: &[u8]) -> bool {
        if body.len() + chunk.len() > self.max_bytes {
            warn!(
                "{source} exceeded the {} byte limit while downloading",
                self.max_bytes
            );
            return false;
        }
        body.extend_from_slice(chunk);
        true
    }

    async fn fetch_http(&self, url: &str) -> Option<Bytes> {
        let mut response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Download of {url} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Download of {url} returned {status}");
            return None;
        }

        if !self.within_limit(url, response.content_length()) {
            return None;
        }

        let mut body = BytesMut::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if !self.append_chunk(url, &mut body, &chunk) {
                        return None;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Reading body of {url} failed: {e}");
                    return None;
                }
            }
        }
        info!("Downloaded {} bytes from {url}", body.len());
        Some(body.freeze())
    }

    async fn fetch_s3(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let Some(s3) = &self.s3 else {
            warn!("s3://{bucket}/{key} requested but S3 is not configured");
            return None;
        };

        let source = format!("s3://{bucket}/{key}");
        let mut object = match s3.get_object().bucket(bucket).key(key).send().await {
            Ok(o) => o,
            Err(e) => {
                warn!("S3 get_object s3://{bucket}/{key} failed: {e}");
                return None;
            }
        };

        let advertised = object.content_length().and_then(|n| u64::try_from(n).ok());
        if !self.within_limit(&source, advertised) {
            return None;
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = object.body.next().await {
            match chunk {
                Ok(chunk) => {
                    if !self.append_chunk(&source, &mut body, &chunk) {
                        return None;
                    }
                }
                Err(e) => {
                    warn!("Reading {source} failed: {e}");
                    return None;
                }
            }
        }
        info!("Fetched {} bytes from {source}", body.len());
        Some(body.freeze())
    }
}

#[async_trait]
impl BlobFetcher for BlobClient {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        match parse_s3_url(url) {
            Some((bucket, key)) => self.fetch_s3(bucket, key).await,
            None => self.fetch_http(url).await,
        }
    }
}

/// Splits `s3://bucket/key/with/slashes` into bucket and key.
pub fn parse_s3_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("s3://")?;
    let (bucket, key) = rest.split_once('/')?;
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    Some((bucket, key))
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "signals-static",
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_url() {
        assert_eq!(
            parse_s3_url("s3://cvs/talent/42/cv.pdf"),
            Some(("cvs", "talent/42/cv.pdf"))
        );
        assert_eq!(parse_s3_url("s3://cvs/"), None);
        assert_eq!(parse_s3_url("s3://cvs"), None);
        assert_eq!(parse_s3_url("https://example.com/cv.pdf"), None);
    }

    #[tokio::test]
    async fn test_unconfigured_s3_yields_none() {
        let client = BlobClient::new(None, 1024).unwrap();
        assert!(client.fetch("s3://cvs/cv.pdf").await.is_none());
    }

    /// Serves one canned HTTP response on a local port and returns its URL.
    async fn serve_once(response: Vec<u8>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/cv.pdf")
    }

    fn fixed_length_response(body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    fn chunked_response(body: &[u8]) -> Vec<u8> {
        let mut response =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n"
                .to_vec();
        for chunk in body.chunks(8) {
            response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            response.extend_from_slice(chunk);
            response.extend_from_slice(b"\r\n");
        }
        response.extend_from_slice(b"0\r\n\r\n");
        response
    }

    #[tokio::test]
    async fn test_download_within_limit() {
        let url = serve_once(fixed_length_response(b"%PDF-1.7 small")).await;
        let client = BlobClient::new(None, 1024).unwrap();
        assert_eq!(
            client.fetch(&url).await.as_deref(),
            Some(&b"%PDF-1.7 small"[..])
        );
    }

    #[tokio::test]
    async fn test_advertised_length_over_limit_is_rejected() {
        let url = serve_once(fixed_length_response(&[b'x'; 64])).await;
        let client = BlobClient::new(None, 16).unwrap();
        assert!(client.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_is_rejected() {
        let url = serve_once(chunked_response(&[b'x'; 64])).await;
        let client = BlobClient::new(None, 16).unwrap();
        assert!(client.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_zero_limit_rejects_any_body() {
        let url = serve_once(chunked_response(b"a")).await;
        let client = BlobClient::new(None, 0).unwrap();
        assert!(client.fetch(&url).await.is_none());
    }
}
