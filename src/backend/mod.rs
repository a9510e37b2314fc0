//! Client for the association's REST backend.
//!
//! The backend owns all durable membership state: application records,
//! approval and rejection, the counter-signatory's signature and the
//! short-lived upload authorizations for the content store.

pub mod session;

pub use session::Session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::member::model::{ApprovalState, MemberRecord};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status} for {endpoint}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("backend response missing {0}")]
    MalformedResponse(&'static str),
}

/// `GET /session` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(default)]
    pub membership_number: Option<String>,
    pub approval_state: ApprovalState,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub snapshot_record: MemberRecord,
}

/// `POST` approval payload: the backend expects the already-published
/// artifact URLs as part of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub user_id: String,
    pub comment: String,
    pub final_form_url: String,
    pub card_front_url: String,
    pub card_back_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApprovalResponse {
    membership_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CounterSignatureResponse {
    signature_image_url: Option<String>,
}

/// Query for a short-lived signed upload authorization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub target_identifier: String,
    pub folder: String,
    pub resource_type: String,
    pub format: String,
}

impl AuthorizationRequest {
    pub fn image(target_identifier: &str, folder: &str) -> Self {
        Self {
            target_identifier: target_identifier.to_string(),
            folder: folder.to_string(),
            resource_type: "image".to_string(),
            format: "png".to_string(),
        }
    }
}

/// Signed parameters authorizing one upload to the content store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadAuthorization {
    pub signature: String,
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

#[async_trait]
pub trait MembershipBackend: Send + Sync {
    async fn session_status(&self, session: &Session) -> Result<SessionStatus, BackendError>;

    /// URL of the counter-signatory's signature image.
    async fn counter_signature_url(&self, session: &Session) -> Result<String, BackendError>;

    async fn pending_adhesions(&self, session: &Session)
        -> Result<Vec<MemberRecord>, BackendError>;

    async fn adhesion(&self, session: &Session, id: &str) -> Result<MemberRecord, BackendError>;

    /// Approve an application; the returned membership number is the only
    /// state mutation of the whole pipeline.
    async fn approve(
        &self,
        session: &Session,
        request: &ApprovalRequest,
    ) -> Result<String, BackendError>;

    async fn reject(
        &self,
        session: &Session,
        user_id: &str,
        reason: &str,
    ) -> Result<(), BackendError>;

    async fn upload_authorization(
        &self,
        session: &Session,
        request: &AuthorizationRequest,
    ) -> Result<UploadAuthorization, BackendError>;
}

/// reqwest implementation against the association API.
pub struct AssociationApi {
    client: reqwest::Client,
    base_url: String,
}

impl AssociationApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn check_status(
        endpoint: &'static str,
        response: &reqwest::Response,
    ) -> Result<(), BackendError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status {
                endpoint,
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl MembershipBackend for AssociationApi {
    async fn session_status(&self, session: &Session) -> Result<SessionStatus, BackendError> {
        let response = self
            .client
            .get(self.url("/session"))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::check_status("/session", &response)?;
        Ok(response.json().await?)
    }

    async fn counter_signature_url(&self, session: &Session) -> Result<String, BackendError> {
        let response = self
            .client
            .get(self.url("/signature-president"))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::check_status("/signature-president", &response)?;
        let body: CounterSignatureResponse = response.json().await?;
        body.signature_image_url
            .ok_or(BackendError::MalformedResponse("signatureImageUrl"))
    }

    async fn pending_adhesions(
        &self,
        session: &Session,
    ) -> Result<Vec<MemberRecord>, BackendError> {
        let response = self
            .client
            .get(self.url("/adhesions/en-attente"))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::check_status("/adhesions/en-attente", &response)?;
        Ok(response.json().await?)
    }

    async fn adhesion(&self, session: &Session, id: &str) -> Result<MemberRecord, BackendError> {
        let response = self
            .client
            .get(format!("{}/{id}", self.url("/adhesions")))
            .bearer_auth(session.token())
            .send()
            .await?;
        Self::check_status("/adhesions/{id}", &response)?;
        Ok(response.json().await?)
    }

    async fn approve(
        &self,
        session: &Session,
        request: &ApprovalRequest,
    ) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url("/adhesions/approbation"))
            .bearer_auth(session.token())
            .json(request)
            .send()
            .await?;
        Self::check_status("/adhesions/approbation", &response)?;
        let body: ApprovalResponse = response.json().await?;
        body.membership_number
            .filter(|n| !n.is_empty())
            .ok_or(BackendError::MalformedResponse("membershipNumber"))
    }

    async fn reject(
        &self,
        session: &Session,
        user_id: &str,
        reason: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/adhesions/rejet"))
            .bearer_auth(session.token())
            .json(&serde_json::json!({ "userId": user_id, "reason": reason }))
            .send()
            .await?;
        Self::check_status("/adhesions/rejet", &response)
    }

    async fn upload_authorization(
        &self,
        session: &Session,
        request: &AuthorizationRequest,
    ) -> Result<UploadAuthorization, BackendError> {
        let response = self
            .client
            .get(self.url("/autorisation-envoi"))
            .bearer_auth(session.token())
            .query(request)
            .send()
            .await?;
        Self::check_status("/autorisation-envoi", &response)?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_request_defaults() {
        let request = AuthorizationRequest::image("adhesions/6543f2", "adhesions");
        assert_eq!(request.resource_type, "image");
        assert_eq!(request.format, "png");
        assert_eq!(request.target_identifier, "adhesions/6543f2");
    }

    #[test]
    fn test_upload_authorization_wire_shape() {
        let json = r#"{
            "signature": "deadbeef",
            "timestamp": 1700000000,
            "apiKey": "key-1",
            "cloudName": "agc",
            "uploadPreset": "membres"
        }"#;
        let auth: UploadAuthorization = serde_json::from_str(json).unwrap();
        assert_eq!(auth.cloud_name, "agc");
        assert_eq!(auth.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_session_status_wire_shape() {
        let json = r#"{
            "membershipNumber": "AGC-2024-001",
            "approvalState": "approved",
            "snapshotRecord": { "id": "6543f2", "nom": "Diallo" }
        }"#;
        let status: SessionStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.approval_state, ApprovalState::Approved);
        assert_eq!(status.membership_number.as_deref(), Some("AGC-2024-001"));
        assert_eq!(status.snapshot_record.last_name(), "Diallo");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = AssociationApi::new(reqwest::Client::new(), "https://api.example.org/".into());
        assert_eq!(api.url("/session"), "https://api.example.org/session");
    }
}
