//! Image host client for collection thumbnails
//!
//! Speaks the ImgBB upload API: multipart POST with an `image` field and
//! the API key as a `key` query parameter. The hosted URL comes back as
//! `data.url`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::models::ThumbnailUpload;

/// Image upload errors
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("image upload is not configured")]
    NotConfigured,
    #[error("invalid image payload: {0}")]
    InvalidPayload(String),
    #[error("image exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("network error: {0}")]
    Network(String),
    #[error("image host returned HTTP {0}")]
    Http(u16),
    #[error("unexpected image host response: {0}")]
    Parse(String),
}

/// Accepts image bytes and returns a hosted URL
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: Vec<u8>, file_name: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

/// ImgBB-compatible uploader
pub struct ImgbbUploader {
    http: Client,
    upload_url: String,
    api_key: Option<String>,
}

impl ImgbbUploader {
    pub fn new(
        upload_url: &str,
        api_key: Option<String>,
        timeout_ms: u64,
        user_agent: &str,
    ) -> Result<Self, UploadError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(user_agent)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            http,
            upload_url: upload_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ImageHost for ImgbbUploader {
    async fn upload(&self, image: Vec<u8>, file_name: &str) -> Result<String, UploadError> {
        let api_key = self.api_key.as_deref().ok_or(UploadError::NotConfigured)?;
        let mime = image_mime(&image)?;

        debug!("Uploading thumbnail {} ({} bytes)", file_name, image.len());

        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| UploadError::InvalidPayload(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(&self.upload_url)
            .query(&[("key", api_key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Image host rejected upload of {}: HTTP {}", file_name, status);
            return Err(UploadError::Http(status.as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Parse(e.to_string()))?;

        body.data
            .map(|d| d.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| UploadError::Parse("missing data.url".to_string()))
    }
}

/// Decode a base64 thumbnail (plain or `data:` URL) and enforce the size cap
pub fn decode_thumbnail(upload: &ThumbnailUpload, max_bytes: usize) -> Result<Vec<u8>, UploadError> {
    let payload = match upload.data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => upload.data.as_str(),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| UploadError::InvalidPayload(e.to_string()))?;

    if bytes.is_empty() {
        return Err(UploadError::InvalidPayload("empty image".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge { max_bytes });
    }
    Ok(bytes)
}

/// Sniff the image format from its magic bytes
pub fn image_mime(bytes: &[u8]) -> Result<&'static str, UploadError> {
    use image::ImageFormat;

    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Gif) => Ok("image/gif"),
        Ok(ImageFormat::WebP) => Ok("image/webp"),
        Ok(ImageFormat::Bmp) => Ok("image/bmp"),
        _ => Err(UploadError::UnsupportedFormat),
    }
}

/// File name sent to the host when the client did not supply one
pub fn thumbnail_file_name(upload: &ThumbnailUpload) -> String {
    upload
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("thumbnail-{}", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn upload(data: String) -> ThumbnailUpload {
        ThumbnailUpload {
            data,
            file_name: None,
        }
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        let encoded = STANDARD.encode(PNG_HEADER);
        assert_eq!(decode_thumbnail(&upload(encoded.clone()), 1024).unwrap(), PNG_HEADER);

        let data_url = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_thumbnail(&upload(data_url), 1024).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode_thumbnail(&upload("!!not base64!!".to_string()), 1024),
            Err(UploadError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_thumbnail(&upload(String::new()), 1024),
            Err(UploadError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_thumbnail(&upload(STANDARD.encode(PNG_HEADER)), 4),
            Err(UploadError::TooLarge { max_bytes: 4 })
        ));
    }

    #[test]
    fn test_image_mime_sniffing() {
        assert_eq!(image_mime(PNG_HEADER).unwrap(), "image/png");
        assert_eq!(image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap(), "image/jpeg");
        assert!(matches!(image_mime(b"plain text"), Err(UploadError::UnsupportedFormat)));
    }

    #[test]
    fn test_thumbnail_file_name() {
        let named = ThumbnailUpload {
            data: String::new(),
            file_name: Some(" cover.png ".to_string()),
        };
        assert_eq!(thumbnail_file_name(&named), "cover.png");
        assert!(thumbnail_file_name(&upload(String::new())).starts_with("thumbnail-"));
    }

    #[tokio::test]
    async fn test_upload_without_key_is_not_configured() {
        let uploader = ImgbbUploader::new("http://127.0.0.1:9/upload", None, 1000, "test").unwrap();
        let result = uploader.upload(PNG_HEADER.to_vec(), "a.png").await;
        assert!(matches!(result, Err(UploadError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_before_network() {
        let uploader =
            ImgbbUploader::new("http://127.0.0.1:9/upload", Some("k".to_string()), 1000, "test")
                .unwrap();
        let result = uploader.upload(b"not an image".to_vec(), "a.txt").await;
        assert!(matches!(result, Err(UploadError::UnsupportedFormat)));
    }
}
