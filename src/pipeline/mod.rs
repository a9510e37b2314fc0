//! Two-phase document publish pipeline.
//!
//! The membership number is only assigned by the backend approval call,
//! but the printed documents embed that number and the approval call
//! itself expects URLs of already-published artifacts. The cycle is broken
//! by publishing provisional artifacts first, then republishing final
//! revisions over the same store identifiers once the number is known.

pub mod generators;
pub mod orchestrator;

pub use generators::{DocumentGenerator, SurfaceGenerator};
pub use orchestrator::DocumentPipeline;

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::artifact::DocumentArtifact;
use crate::backend::BackendError;
use crate::publish::PublishError;
use crate::render::RenderError;

/// Pipeline states, in strict program order. Transitions are forward-only;
/// any failure aborts the run at its current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    FetchCounterSignature,
    PublishProvisionalForm,
    PublishProvisionalCardFront,
    PublishProvisionalCardBack,
    ApproveMembership,
    PublishFinalForm,
    PublishFinalCardFront,
    PublishFinalCardBack,
    Done,
}

impl PipelineStage {
    pub fn next(self) -> PipelineStage {
        use PipelineStage::*;
        match self {
            Start => FetchCounterSignature,
            FetchCounterSignature => PublishProvisionalForm,
            PublishProvisionalForm => PublishProvisionalCardFront,
            PublishProvisionalCardFront => PublishProvisionalCardBack,
            PublishProvisionalCardBack => ApproveMembership,
            ApproveMembership => PublishFinalForm,
            PublishFinalForm => PublishFinalCardFront,
            PublishFinalCardFront => PublishFinalCardBack,
            PublishFinalCardBack => Done,
            Done => Done,
        }
    }

    /// Stages strictly after the backend approval call. A failure here
    /// leaves the member approved server-side with provisional artifacts.
    pub fn is_past_approval(self) -> bool {
        matches!(
            self,
            PipelineStage::PublishFinalForm
                | PipelineStage::PublishFinalCardFront
                | PipelineStage::PublishFinalCardBack
        )
    }

    pub fn label(self) -> &'static str {
        use PipelineStage::*;
        match self {
            Start => "start",
            FetchCounterSignature => "fetch-counter-signature",
            PublishProvisionalForm => "publish-provisional-form",
            PublishProvisionalCardFront => "publish-provisional-card-front",
            PublishProvisionalCardBack => "publish-provisional-card-back",
            ApproveMembership => "approve-membership",
            PublishFinalForm => "publish-final-form",
            PublishFinalCardFront => "publish-final-card-front",
            PublishFinalCardBack => "publish-final-card-back",
            Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What went wrong inside a stage.
#[derive(Debug, Error)]
pub enum PipelineFailure {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("cancelled by caller")]
    Cancelled,
    #[error("pipeline state is missing {0}")]
    Incomplete(&'static str),
}

#[derive(Debug, Error)]
#[error("pipeline failed at stage {stage}: {failure}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub failure: PipelineFailure,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, failure: impl Into<PipelineFailure>) -> Self {
        Self {
            stage,
            failure: failure.into(),
        }
    }

    /// The member is already approved server-side; only the artifacts are
    /// stale. The operator recovers with the regeneration action, never by
    /// re-approving.
    pub fn occurred_after_approval(&self) -> bool {
        self.stage.is_past_approval()
    }
}

/// Successful approval: the assigned number plus the three final
/// artifacts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalOutcome {
    pub membership_number: String,
    pub artifacts: Vec<DocumentArtifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_forward_only() {
        let mut stage = PipelineStage::Start;
        let mut seen = vec![stage];
        while stage != PipelineStage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(PipelineStage::Done.next(), PipelineStage::Done);
    }

    #[test]
    fn test_past_approval_window() {
        assert!(!PipelineStage::ApproveMembership.is_past_approval());
        assert!(PipelineStage::PublishFinalForm.is_past_approval());
        assert!(PipelineStage::PublishFinalCardBack.is_past_approval());
        assert!(!PipelineStage::Done.is_past_approval());
    }

    #[test]
    fn test_error_reports_stage() {
        let err = PipelineError::new(
            PipelineStage::PublishFinalCardFront,
            PipelineFailure::Incomplete("membership number"),
        );
        assert!(err.occurred_after_approval());
        assert!(err.to_string().contains("publish-final-card-front"));
    }
}
