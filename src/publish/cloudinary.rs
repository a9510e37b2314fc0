//! Cloudinary-style content store client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{ContentStore, PublishError};
use crate::artifact::PublishResult;
use crate::backend::UploadAuthorization;
use crate::imaging::EmbeddableImage;

pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base: String,
    timeout: Duration,
}

impl CloudinaryStore {
    pub fn new(client: reqwest::Client, api_base: String, timeout: Duration) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default, alias = "secureUrl")]
    secure_url: Option<String>,
    #[serde(default, alias = "publicId")]
    public_id: Option<String>,
}

#[async_trait]
impl ContentStore for CloudinaryStore {
    async fn upload(
        &self,
        image: &EmbeddableImage,
        public_id: &str,
        authorization: &UploadAuthorization,
    ) -> Result<PublishResult, PublishError> {
        let url = format!("{}/{}/image/upload", self.api_base, authorization.cloud_name);

        // The store accepts the image as its data-URI form directly.
        let form = reqwest::multipart::Form::new()
            .text("file", image.data_uri().to_string())
            .text("public_id", public_id.to_string())
            .text("upload_preset", authorization.upload_preset.clone())
            .text("api_key", authorization.api_key.clone())
            .text("timestamp", authorization.timestamp.to_string())
            .text("signature", authorization.signature.clone());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Timeout(self.timeout)
                } else {
                    PublishError::Upload(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Upload(format!(
                "store returned status {status} for {public_id}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Upload(e.to_string()))?;

        let secure_url = body
            .secure_url
            .ok_or(PublishError::MalformedResponse("secure_url"))?;
        let returned_id = body
            .public_id
            .ok_or(PublishError::MalformedResponse("public_id"))?;

        Ok(PublishResult {
            url: secure_url,
            public_id: returned_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_accepts_both_naming_conventions() {
        let snake: UploadResponse = serde_json::from_str(
            r#"{"secure_url": "https://res.example.com/a.png", "public_id": "adhesions/1"}"#,
        )
        .unwrap();
        assert_eq!(snake.public_id.as_deref(), Some("adhesions/1"));

        let camel: UploadResponse = serde_json::from_str(
            r#"{"secureUrl": "https://res.example.com/a.png", "publicId": "adhesions/1"}"#,
        )
        .unwrap();
        assert_eq!(camel.secure_url.as_deref(), Some("https://res.example.com/a.png"));
    }

    #[test]
    fn test_upload_response_tolerates_missing_fields() {
        let empty: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.secure_url.is_none());
        assert!(empty.public_id.is_none());
    }
}
