//! Shared test doubles for the pipeline collaborators.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agc_adhesion_server::artifact::PublishResult;
use agc_adhesion_server::backend::{
    ApprovalRequest, AuthorizationRequest, BackendError, MembershipBackend, Session,
    SessionStatus, UploadAuthorization,
};
use agc_adhesion_server::imaging::{EmbeddableImage, PNG_MIME};
use agc_adhesion_server::member::model::MemberRecord;
use agc_adhesion_server::publish::{ContentStore, PublishError};
use agc_adhesion_server::qr::QrProvider;
use agc_adhesion_server::render::{MarkupDocument, RenderEngine, RenderError};

/// Engine double: "rasterizes" by echoing the markup source bytes, so
/// assertions can inspect what was rendered.
pub struct EchoEngine;

#[async_trait]
impl RenderEngine for EchoEngine {
    async fn render_png(
        &self,
        document: &MarkupDocument,
        _width: u32,
        _height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        Ok(document.source.clone().into_bytes())
    }
}

/// In-memory content store with overwrite-by-identifier semantics and an
/// upload history for ordering assertions.
#[derive(Default)]
pub struct MemoryContentStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub history: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryContentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn url_for(public_id: &str) -> String {
        format!("https://res.store.example/{public_id}.png")
    }

    pub fn content(&self, public_id: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(public_id).cloned()
    }

    pub fn upload_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn upload(
        &self,
        image: &EmbeddableImage,
        public_id: &str,
        _authorization: &UploadAuthorization,
    ) -> Result<PublishResult, PublishError> {
        let bytes = image
            .bytes()
            .map_err(|e| PublishError::Upload(e.to_string()))?;
        self.objects
            .lock()
            .unwrap()
            .insert(public_id.to_string(), bytes.clone());
        self.history
            .lock()
            .unwrap()
            .push((public_id.to_string(), bytes));
        Ok(PublishResult {
            url: Self::url_for(public_id),
            public_id: public_id.to_string(),
        })
    }
}

/// Backend double with a scripted membership number and a configurable
/// authorization failure point.
pub struct ScriptedBackend {
    pub membership_number: String,
    /// Fail the Nth (0-based) authorization request and all later ones;
    /// `usize::MAX` never fails.
    pub fail_authorization_from: AtomicUsize,
    pub authorization_requests: Mutex<Vec<AuthorizationRequest>>,
    pub approvals: Mutex<Vec<ApprovalRequest>>,
    pub rejections: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new(membership_number: &str) -> Arc<Self> {
        Arc::new(Self {
            membership_number: membership_number.to_string(),
            fail_authorization_from: AtomicUsize::new(usize::MAX),
            authorization_requests: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            rejections: Mutex::new(Vec::new()),
        })
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.lock().unwrap().len()
    }
}

#[async_trait]
impl MembershipBackend for ScriptedBackend {
    async fn session_status(&self, _session: &Session) -> Result<SessionStatus, BackendError> {
        Ok(serde_json::from_value(json!({
            "approvalState": "pending",
            "snapshotRecord": { "id": "m-1" }
        }))
        .expect("static session status"))
    }

    async fn counter_signature_url(&self, _session: &Session) -> Result<String, BackendError> {
        // Unreachable on purpose: the codec helper must degrade to its
        // placeholder without aborting the run.
        Ok("http://127.0.0.1:9/signature-president.png".to_string())
    }

    async fn pending_adhesions(
        &self,
        _session: &Session,
    ) -> Result<Vec<MemberRecord>, BackendError> {
        Ok(Vec::new())
    }

    async fn adhesion(&self, _session: &Session, id: &str) -> Result<MemberRecord, BackendError> {
        Ok(sample_record(id, None))
    }

    async fn approve(
        &self,
        _session: &Session,
        request: &ApprovalRequest,
    ) -> Result<String, BackendError> {
        self.approvals.lock().unwrap().push(request.clone());
        Ok(self.membership_number.clone())
    }

    async fn reject(
        &self,
        _session: &Session,
        user_id: &str,
        reason: &str,
    ) -> Result<(), BackendError> {
        self.rejections
            .lock()
            .unwrap()
            .push((user_id.to_string(), reason.to_string()));
        Ok(())
    }

    async fn upload_authorization(
        &self,
        _session: &Session,
        request: &AuthorizationRequest,
    ) -> Result<UploadAuthorization, BackendError> {
        let mut requests = self.authorization_requests.lock().unwrap();
        if requests.len() >= self.fail_authorization_from.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                endpoint: "/autorisation-envoi",
                status: 500,
            });
        }
        requests.push(request.clone());
        Ok(UploadAuthorization {
            signature: "deadbeef".to_string(),
            timestamp: 1_700_000_000,
            api_key: "key-1".to_string(),
            cloud_name: "agc".to_string(),
            upload_preset: "membres".to_string(),
        })
    }
}

/// QR double: records every payload and embeds it verbatim, so the "QR
/// decodes back to the form URL" property is checkable.
#[derive(Default)]
pub struct RecordingQr {
    pub payloads: Mutex<Vec<String>>,
}

impl RecordingQr {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl QrProvider for RecordingQr {
    async fn generate(&self, url: &str) -> EmbeddableImage {
        self.payloads.lock().unwrap().push(url.to_string());
        EmbeddableImage::from_bytes(PNG_MIME, url.as_bytes())
    }
}

pub fn sample_record(id: &str, membership_number: Option<&str>) -> MemberRecord {
    let mut snapshot = json!({
        "id": id,
        "nom": "Diallo",
        "prenom": "Mariama",
        "date_naissance": "03-11-1985",
        "lieu_naissance": "Conakry",
        "adresse": "12 avenue de la Paix",
        "profession": "Comptable",
        "ville_residence": "Brazzaville",
        "date_entree": "14-02-2023",
        "employeur": "Cabinet Nzamba",
        "telephone": "+242 06 612 34 56",
        "conjoint": "Ibrahima Diallo",
        "nombre_enfants": 2,
        "numero_consulaire": "GC-88412"
    });
    if let Some(number) = membership_number {
        snapshot["numero_membre"] = json!(number);
    }
    serde_json::from_value(snapshot).expect("static sample record")
}
