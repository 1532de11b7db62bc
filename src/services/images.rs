//! Photo ingestion: filename-based dedup and download/resize/re-encode.
//!
//! Dedup works on names, not bytes. A candidate URL's file stem is snake-cased
//! into a key; a stored file name yields its key by dropping the
//! storage-assigned `_<suffix>` tail. Equal keys mean "already ingested".

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::errors::SyncError;
use crate::helpers::{snake_case, strip_storage_suffix, url_file_stem};

/// A re-encoded image ready for storage.
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TranscodedImage {
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Dedup key for a candidate image URL.
pub fn candidate_key(url: &str) -> String {
    snake_case(url_file_stem(url))
}

/// Dedup key for an already-stored file name.
pub fn existing_key(stored_name: &str) -> &str {
    strip_storage_suffix(stored_name)
}

/// Whether `url` names an image not yet present among `stored_names`.
pub fn is_new_image(url: &str, stored_names: &[String]) -> bool {
    let key = candidate_key(url);
    !stored_names.iter().any(|name| existing_key(name) == key)
}

/// Downloads images and re-encodes them as size-bounded JPEGs.
#[derive(Debug, Clone)]
pub struct ImageTranscoder {
    client: reqwest::Client,
    max_width: u32,
}

impl ImageTranscoder {
    pub fn new(client: reqwest::Client, max_width: u32) -> Self {
        Self { client, max_width }
    }

    /// Download `url` and re-encode it with `reencode_jpeg`.
    pub async fn fetch_and_transcode(&self, url: &str) -> Result<TranscodedImage, SyncError> {
        let bytes = fetch_bytes(&self.client, url).await?;
        let max_width = self.max_width;
        tokio::task::spawn_blocking(move || reencode_jpeg(&bytes, max_width))
            .await
            .map_err(|e| SyncError::Decode(format!("image worker failed: {}", e)))?
    }
}

/// GET a binary resource, treating transport errors and non-2xx statuses as `Fetch` errors.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SyncError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SyncError::Fetch(format!("GET {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(SyncError::Fetch(format!(
            "GET {} returned HTTP {}",
            url,
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| SyncError::Fetch(format!("reading body of {} failed: {}", url, e)))?;
    Ok(body.to_vec())
}

/// Decode any supported format and re-encode as JPEG (encoder default quality).
///
/// Images wider than `max_width` are scaled to exactly `max_width` with
/// nearest-neighbour sampling, keeping the aspect ratio. Alpha is dropped.
pub fn reencode_jpeg(bytes: &[u8], max_width: u32) -> Result<TranscodedImage, SyncError> {
    let img = decode(bytes)?;

    let img = if img.width() > max_width {
        let height = scaled_height(img.width(), img.height(), max_width);
        img.resize_exact(max_width, height, FilterType::Nearest)
    } else {
        img
    };

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new(&mut out))
        .map_err(|e| SyncError::Decode(format!("JPEG encode failed: {}", e)))?;

    Ok(TranscodedImage {
        bytes: out,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Decode any supported format and re-encode losslessly as PNG.
pub fn reencode_png(bytes: &[u8]) -> Result<TranscodedImage, SyncError> {
    let img = decode(bytes)?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| SyncError::Decode(format!("PNG encode failed: {}", e)))?;

    Ok(TranscodedImage {
        bytes: out,
        width: img.width(),
        height: img.height(),
    })
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, SyncError> {
    image::load_from_memory(bytes)
        .map_err(|e| SyncError::Decode(format!("image decode failed: {}", e)))
}

/// Height after scaling `width` down to `target_width`, never below 1px.
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = u64::from(height) * u64::from(target_width) / u64::from(width.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
