//! Pipeline orchestrator: sequences rendering, publishing and the backend
//! approval call through the explicit stage machine.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::generators::DocumentGenerator;
use super::{ApprovalOutcome, PipelineError, PipelineFailure, PipelineStage};
use crate::artifact::{ArtifactKind, DocumentArtifact, Revision};
use crate::backend::{ApprovalRequest, MembershipBackend, Session};
use crate::imaging::{self, EmbeddableImage, PNG_MIME};
use crate::member::model::MemberRecord;
use crate::metrics;
use crate::publish::AssetPublisher;
use crate::qr::QrProvider;
use crate::render::TemplateImages;

/// Everything a run accumulates: the record (mutated once, when the
/// membership number arrives), the fetched embeddable images and the
/// artifacts published so far.
struct PipelineRun {
    record: MemberRecord,
    comment: String,
    images: TemplateImages,
    form: Option<DocumentArtifact>,
    card_front: Option<DocumentArtifact>,
    card_back: Option<DocumentArtifact>,
}

impl PipelineRun {
    fn new(record: MemberRecord, comment: String) -> Self {
        Self {
            record,
            comment,
            images: TemplateImages::default(),
            form: None,
            card_front: None,
            card_back: None,
        }
    }

    fn form_url(&self) -> Result<String, PipelineFailure> {
        self.form
            .as_ref()
            .map(|a| a.url.clone())
            .ok_or(PipelineFailure::Incomplete("published form URL"))
    }

    fn artifact_url(
        artifact: &Option<DocumentArtifact>,
        what: &'static str,
    ) -> Result<String, PipelineFailure> {
        artifact
            .as_ref()
            .map(|a| a.url.clone())
            .ok_or(PipelineFailure::Incomplete(what))
    }

    fn into_outcome(self) -> Result<ApprovalOutcome, PipelineFailure> {
        let membership_number = self
            .record
            .membership_number
            .clone()
            .ok_or(PipelineFailure::Incomplete("membership number"))?;
        let artifacts = [self.form, self.card_front, self.card_back]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        if artifacts.len() != 3 {
            return Err(PipelineFailure::Incomplete("published artifacts"));
        }
        Ok(ApprovalOutcome {
            membership_number,
            artifacts,
        })
    }
}

pub struct DocumentPipeline {
    backend: Arc<dyn MembershipBackend>,
    publisher: AssetPublisher,
    qr: Arc<dyn QrProvider>,
    form: Arc<dyn DocumentGenerator>,
    card_front: Arc<dyn DocumentGenerator>,
    card_back: Arc<dyn DocumentGenerator>,
    http_client: reqwest::Client,
    logo_url: Option<String>,
}

impl DocumentPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<dyn MembershipBackend>,
        publisher: AssetPublisher,
        qr: Arc<dyn QrProvider>,
        form: Arc<dyn DocumentGenerator>,
        card_front: Arc<dyn DocumentGenerator>,
        card_back: Arc<dyn DocumentGenerator>,
        http_client: reqwest::Client,
        logo_url: Option<String>,
    ) -> Self {
        Self {
            backend,
            publisher,
            qr,
            form,
            card_front,
            card_back,
            http_client,
            logo_url,
        }
    }

    /// Run the full approval pipeline for one application.
    ///
    /// Transitions are forward-only; the first failure aborts the run and
    /// names its stage. A failure in the final-revision stages means the
    /// member is already approved — callers must not retry the approval,
    /// only the artifact regeneration.
    pub async fn approve(
        &self,
        session: &Session,
        record: MemberRecord,
        comment: &str,
        cancel: CancellationToken,
    ) -> Result<ApprovalOutcome, PipelineError> {
        let member_id = record.id.clone();
        let mut run = PipelineRun::new(record, comment.to_string());
        let mut stage = PipelineStage::Start;

        while stage != PipelineStage::Done {
            if cancel.is_cancelled() {
                metrics::PIPELINE_RUNS.with_label_values(&["cancelled"]).inc();
                return Err(PipelineError::new(stage, PipelineFailure::Cancelled));
            }
            log::info!("dossier {member_id}: stage {stage}");
            if let Err(failure) = self.step(stage, session, &mut run).await {
                metrics::PIPELINE_RUNS.with_label_values(&["failure"]).inc();
                metrics::PIPELINE_STAGE_FAILURES
                    .with_label_values(&[stage.label()])
                    .inc();
                return Err(PipelineError::new(stage, failure));
            }
            stage = stage.next();
        }

        metrics::PIPELINE_RUNS.with_label_values(&["success"]).inc();
        run.into_outcome()
            .map_err(|failure| PipelineError::new(PipelineStage::Done, failure))
    }

    async fn step(
        &self,
        stage: PipelineStage,
        session: &Session,
        run: &mut PipelineRun,
    ) -> Result<(), PipelineFailure> {
        match stage {
            PipelineStage::Start | PipelineStage::Done => Ok(()),

            PipelineStage::FetchCounterSignature => {
                let url = self.backend.counter_signature_url(session).await?;
                run.images = self.fetch_images(&run.record, &url).await;
                Ok(())
            }

            PipelineStage::PublishProvisionalForm => {
                run.form = Some(
                    self.publish_document(session, &*self.form, run, Revision::Provisional)
                        .await?,
                );
                Ok(())
            }

            PipelineStage::PublishProvisionalCardFront => {
                run.card_front = Some(
                    self.publish_document(session, &*self.card_front, run, Revision::Provisional)
                        .await?,
                );
                Ok(())
            }

            PipelineStage::PublishProvisionalCardBack => {
                let form_url = run.form_url()?;
                run.images.qr_code = Some(self.qr.generate(&form_url).await);
                run.card_back = Some(
                    self.publish_document(session, &*self.card_back, run, Revision::Provisional)
                        .await?,
                );
                Ok(())
            }

            PipelineStage::ApproveMembership => {
                let request = ApprovalRequest {
                    user_id: run.record.id.clone(),
                    comment: run.comment.clone(),
                    final_form_url: run.form_url()?,
                    card_front_url: PipelineRun::artifact_url(
                        &run.card_front,
                        "published card front URL",
                    )?,
                    card_back_url: PipelineRun::artifact_url(
                        &run.card_back,
                        "published card back URL",
                    )?,
                };
                let number = self.backend.approve(session, &request).await?;
                log::info!("dossier {}: assigned number {number}", run.record.id);
                run.record.set_membership_number(number);
                Ok(())
            }

            PipelineStage::PublishFinalForm => {
                run.form = Some(
                    self.publish_document(session, &*self.form, run, Revision::Final)
                        .await?,
                );
                Ok(())
            }

            PipelineStage::PublishFinalCardFront => {
                run.card_front = Some(
                    self.publish_document(session, &*self.card_front, run, Revision::Final)
                        .await?,
                );
                Ok(())
            }

            PipelineStage::PublishFinalCardBack => {
                // The form URL did not change between phases (same store
                // key, overwritten content), but the QR is regenerated
                // from the confirmed final URL as a consistency safeguard.
                let form_url = run.form_url()?;
                run.images.qr_code = Some(self.qr.generate(&form_url).await);
                run.card_back = Some(
                    self.publish_document(session, &*self.card_back, run, Revision::Final)
                        .await?,
                );
                Ok(())
            }
        }
    }

    /// Operator-facing recovery for the post-approval failure window:
    /// regenerate selected artifacts for an already-approved member.
    ///
    /// A card-back regeneration republishes the form as well — the QR
    /// payload is the form URL, which is only confirmed by a publish.
    pub async fn regenerate(
        &self,
        session: &Session,
        record: MemberRecord,
        kinds: &[ArtifactKind],
        cancel: CancellationToken,
    ) -> Result<Vec<DocumentArtifact>, PipelineError> {
        let revision = if record.membership_number.is_some() {
            Revision::Final
        } else {
            Revision::Provisional
        };
        let stage_of = |kind: ArtifactKind| match (revision, kind) {
            (Revision::Final, ArtifactKind::AdhesionForm) => PipelineStage::PublishFinalForm,
            (Revision::Final, ArtifactKind::CardFront) => PipelineStage::PublishFinalCardFront,
            (Revision::Final, ArtifactKind::CardBack) => PipelineStage::PublishFinalCardBack,
            (Revision::Provisional, ArtifactKind::AdhesionForm) => {
                PipelineStage::PublishProvisionalForm
            }
            (Revision::Provisional, ArtifactKind::CardFront) => {
                PipelineStage::PublishProvisionalCardFront
            }
            (Revision::Provisional, ArtifactKind::CardBack) => {
                PipelineStage::PublishProvisionalCardBack
            }
        };

        let mut wanted: Vec<ArtifactKind> = ArtifactKind::ALL
            .into_iter()
            .filter(|k| kinds.contains(k))
            .collect();
        if wanted.contains(&ArtifactKind::CardBack)
            && !wanted.contains(&ArtifactKind::AdhesionForm)
        {
            wanted.insert(0, ArtifactKind::AdhesionForm);
        }

        let mut run = PipelineRun::new(record, String::new());

        let signature_url = self
            .backend
            .counter_signature_url(session)
            .await
            .map_err(|e| PipelineError::new(PipelineStage::FetchCounterSignature, e))?;
        run.images = self.fetch_images(&run.record, &signature_url).await;

        let mut regenerated = Vec::new();
        for kind in wanted {
            let stage = stage_of(kind);
            if cancel.is_cancelled() {
                return Err(PipelineError::new(stage, PipelineFailure::Cancelled));
            }
            log::info!("dossier {}: regenerating {kind}", run.record.id);

            if kind == ArtifactKind::CardBack {
                let form_url = run
                    .form_url()
                    .map_err(|failure| PipelineError::new(stage, failure))?;
                run.images.qr_code = Some(self.qr.generate(&form_url).await);
            }

            let generator: &dyn DocumentGenerator = match kind {
                ArtifactKind::AdhesionForm => &*self.form,
                ArtifactKind::CardFront => &*self.card_front,
                ArtifactKind::CardBack => &*self.card_back,
            };
            let artifact = self
                .publish_document(session, generator, &run, revision)
                .await
                .map_err(|failure| PipelineError::new(stage, failure))?;
            match kind {
                ArtifactKind::AdhesionForm => run.form = Some(artifact.clone()),
                ArtifactKind::CardFront => run.card_front = Some(artifact.clone()),
                ArtifactKind::CardBack => run.card_back = Some(artifact.clone()),
            }
            regenerated.push(artifact);
        }
        Ok(regenerated)
    }

    /// Fetch every embeddable image a run may need. All of these are
    /// decorative: failures degrade to placeholders inside the codec
    /// helper and never abort the run.
    async fn fetch_images(&self, record: &MemberRecord, signature_url: &str) -> TemplateImages {
        let mut images = TemplateImages::default();
        images.counter_signature = Some(
            imaging::fetch_and_resize(&self.http_client, signature_url, 300, 120, 90, true).await,
        );
        if let Some(url) = &record.photo_url {
            images.subject_photo =
                Some(imaging::fetch_and_resize(&self.http_client, url, 300, 400, 85, false).await);
        }
        if let Some(url) = &record.signature_url {
            images.signature =
                Some(imaging::fetch_and_resize(&self.http_client, url, 300, 120, 90, true).await);
        }
        if let Some(url) = &self.logo_url {
            images.logo =
                Some(imaging::fetch_and_resize(&self.http_client, url, 200, 200, 90, true).await);
        }
        images
    }

    async fn publish_document(
        &self,
        session: &Session,
        generator: &dyn DocumentGenerator,
        run: &PipelineRun,
        revision: Revision,
    ) -> Result<DocumentArtifact, PipelineFailure> {
        let kind = generator.kind();
        let bytes = generator.generate(&run.record, &run.images).await?;
        let image = EmbeddableImage::from_bytes(PNG_MIME, &bytes);
        let key = kind.publish_key(&run.record.id);
        let result = self
            .publisher
            .publish(session, &image, &key, kind.folder())
            .await?;
        Ok(DocumentArtifact::new(kind, result, revision))
    }
}
