//! Asset publishing: signed authorization followed by the store upload.

pub mod cloudinary;

pub use cloudinary::CloudinaryStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::artifact::PublishResult;
use crate::backend::{
    AuthorizationRequest, BackendError, MembershipBackend, Session, UploadAuthorization,
};
use crate::imaging::EmbeddableImage;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("upload authorization request failed: {0}")]
    Authorization(#[source] BackendError),
    #[error("asset upload failed: {0}")]
    Upload(String),
    #[error("asset upload timed out after {0:?}")]
    Timeout(Duration),
    #[error("asset store response missing {0}")]
    MalformedResponse(&'static str),
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload the image under `public_id`, creating the asset or replacing
    /// its content in place. Callers rely on the overwrite semantics for
    /// final-revision republishing, so the identifier must be passed
    /// verbatim.
    async fn upload(
        &self,
        image: &EmbeddableImage,
        public_id: &str,
        authorization: &UploadAuthorization,
    ) -> Result<PublishResult, PublishError>;
}

/// Publishes one image: obtains the short-lived upload authorization from
/// the backend, then submits the upload. An authorization failure
/// short-circuits the publish — no upload attempt is made.
pub struct AssetPublisher {
    backend: Arc<dyn MembershipBackend>,
    store: Arc<dyn ContentStore>,
}

impl AssetPublisher {
    pub fn new(backend: Arc<dyn MembershipBackend>, store: Arc<dyn ContentStore>) -> Self {
        Self { backend, store }
    }

    pub async fn publish(
        &self,
        session: &Session,
        image: &EmbeddableImage,
        public_id: &str,
        folder: &str,
    ) -> Result<PublishResult, PublishError> {
        let request = AuthorizationRequest {
            target_identifier: public_id.to_string(),
            folder: folder.to_string(),
            resource_type: "image".to_string(),
            format: image.extension().to_string(),
        };
        let authorization = self
            .backend
            .upload_authorization(session, &request)
            .await
            .map_err(PublishError::Authorization)?;

        let result = self.store.upload(image, public_id, &authorization).await?;

        if Url::parse(&result.url).is_err() {
            return Err(PublishError::MalformedResponse("absolute asset URL"));
        }
        if result.public_id.is_empty() {
            return Err(PublishError::MalformedResponse("asset identifier"));
        }
        log::info!("published {public_id} -> {}", result.url);
        Ok(result)
    }
}

impl PublishError {
    /// True when the failure happened before any upload was attempted.
    pub fn is_authorization(&self) -> bool {
        matches!(self, PublishError::Authorization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_errors_are_distinguishable() {
        let err = PublishError::Authorization(BackendError::MalformedResponse("signature"));
        assert!(err.is_authorization());
        assert!(!PublishError::Upload("boom".into()).is_authorization());
    }

    #[test]
    fn test_timeout_display_names_the_bound() {
        let err = PublishError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }
}
