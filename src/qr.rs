//! QR generator adapter.
//!
//! Delegates rasterization to an external URL-to-QR rendering service,
//! downloads the result and re-embeds it. QR absence never blocks card
//! issuance: every failure degrades to the transparent placeholder.

use async_trait::async_trait;

use crate::imaging::{self, EmbeddableImage, ImagingError};

/// Fixed output size of the embedded QR image.
pub const QR_SIZE: u32 = 140;

#[async_trait]
pub trait QrProvider: Send + Sync {
    /// Obtain a QR image whose payload is the given URL.
    async fn generate(&self, url: &str) -> EmbeddableImage;
}

/// Client for a qrserver-style `create-qr-code` endpoint.
pub struct QrServerClient {
    client: reqwest::Client,
    endpoint: String,
}

impl QrServerClient {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    async fn try_generate(&self, data: &str) -> Result<EmbeddableImage, ImagingError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("size", format!("{QR_SIZE}x{QR_SIZE}")),
                ("data", data.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        imaging::embed_resized(&bytes, QR_SIZE, QR_SIZE, 90, true)
    }
}

#[async_trait]
impl QrProvider for QrServerClient {
    async fn generate(&self, url: &str) -> EmbeddableImage {
        match self.try_generate(url).await {
            Ok(image) => image,
            Err(e) => {
                log::warn!("substituting placeholder for QR code of {url}: {e}");
                EmbeddableImage::placeholder()
            }
        }
    }
}
