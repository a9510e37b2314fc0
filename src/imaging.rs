//! Image codec helper.
//!
//! Fetches a remote image, resizes it to bounded dimensions preserving the
//! aspect ratio, re-encodes it as PNG (alpha kept, for signatures and logos)
//! or JPEG (photos) and wraps the result as a data-URI string ready to be
//! embedded into a markup document.
//!
//! A fetch or decode failure never aborts document generation: callers get
//! a 1x1 transparent placeholder and the condition is logged. A missing
//! decorative image must not block issuance.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, ImageFormat, Rgba, RgbaImage};
use lazy_static::lazy_static;
use std::io::Cursor;
use thiserror::Error;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("image codec failed: {0}")]
    Codec(#[from] image::ImageError),
    #[error("embedded image payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// A re-encoded raster image carried as a `data:` URI string.
///
/// Transient value: produced here and by the QR adapter, consumed by the
/// template renderers, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddableImage {
    mime: &'static str,
    data_uri: String,
}

impl EmbeddableImage {
    pub fn from_bytes(mime: &'static str, bytes: &[u8]) -> Self {
        let encoded = STANDARD.encode(bytes);
        Self {
            mime,
            data_uri: format!("data:{mime};base64,{encoded}"),
        }
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Decode the raw image bytes back out of the data URI.
    pub fn bytes(&self) -> Result<Vec<u8>, ImagingError> {
        let payload = self
            .data_uri
            .splitn(2, ',')
            .nth(1)
            .unwrap_or_default();
        Ok(STANDARD.decode(payload)?)
    }

    /// File extension matching the embedded payload.
    pub fn extension(&self) -> &'static str {
        match self.mime {
            JPEG_MIME => "jpg",
            _ => "png",
        }
    }

    /// 1x1 transparent PNG used whenever a source image cannot be obtained.
    pub fn placeholder() -> Self {
        PLACEHOLDER.clone()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data_uri == PLACEHOLDER.data_uri
    }
}

lazy_static! {
    static ref PLACEHOLDER: EmbeddableImage = {
        let pixel = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let mut out = Vec::new();
        pixel
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .expect("encoding a 1x1 PNG cannot fail");
        EmbeddableImage::from_bytes(PNG_MIME, &out)
    };
}

/// Target dimensions for a source of `width`x`height` bounded by
/// `max_width`x`max_height`, aspect ratio preserved.
///
/// The ratio is applied as-is even when it exceeds 1, so undersized sources
/// are scaled up to the bounds.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Decode, resize and re-embed raw image bytes.
///
/// PNG keeps the alpha channel; JPEG flattens to RGB at the given quality.
pub fn embed_resized(
    bytes: &[u8],
    max_width: u32,
    max_height: u32,
    quality: u8,
    preserve_alpha: bool,
) -> Result<EmbeddableImage, ImagingError> {
    let source = image::load_from_memory(bytes)?;
    let (w, h) = scaled_dimensions(source.width(), source.height(), max_width, max_height);
    let resized = source.resize_exact(w, h, FilterType::Lanczos3);

    if preserve_alpha {
        let mut out = Vec::new();
        resized
            .to_rgba8()
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(EmbeddableImage::from_bytes(PNG_MIME, &out))
    } else {
        let mut out = Vec::new();
        let mut cursor = Cursor::new(&mut out);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
        resized.to_rgb8().write_with_encoder(encoder)?;
        Ok(EmbeddableImage::from_bytes(JPEG_MIME, &out))
    }
}

async fn try_fetch_and_resize(
    client: &reqwest::Client,
    url: &str,
    max_width: u32,
    max_height: u32,
    quality: u8,
    preserve_alpha: bool,
) -> Result<EmbeddableImage, ImagingError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    embed_resized(&bytes, max_width, max_height, quality, preserve_alpha)
}

/// Fetch a remote image and re-embed it within the given bounds.
///
/// Degrades to the transparent placeholder on any failure.
pub async fn fetch_and_resize(
    client: &reqwest::Client,
    url: &str,
    max_width: u32,
    max_height: u32,
    quality: u8,
    preserve_alpha: bool,
) -> EmbeddableImage {
    match try_fetch_and_resize(client, url, max_width, max_height, quality, preserve_alpha).await {
        Ok(image) => image,
        Err(e) => {
            log::warn!("substituting placeholder for image at {url}: {e}");
            EmbeddableImage::placeholder()
        }
    }
}
