//! Per-kind document generation capability.
//!
//! The orchestrator never reaches into template or surface internals; it
//! holds one generator per document kind and asks it for captured image
//! bytes.

use async_trait::async_trait;
use std::sync::Arc;

use crate::artifact::ArtifactKind;
use crate::member::model::MemberRecord;
use crate::render::{
    CaptureOptions, DocumentTemplate, OffscreenSurface, RenderError, TemplateImages,
};

#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    /// Render the member's document and return the captured PNG bytes.
    async fn generate(
        &self,
        record: &MemberRecord,
        images: &TemplateImages,
    ) -> Result<Vec<u8>, RenderError>;
}

/// A template bound to the shared off-screen surface.
pub struct SurfaceGenerator<T> {
    template: T,
    surface: Arc<OffscreenSurface>,
}

impl<T: DocumentTemplate> SurfaceGenerator<T> {
    pub fn new(template: T, surface: Arc<OffscreenSurface>) -> Self {
        Self { template, surface }
    }
}

#[async_trait]
impl<T: DocumentTemplate> DocumentGenerator for SurfaceGenerator<T> {
    fn kind(&self) -> ArtifactKind {
        self.template.kind()
    }

    async fn generate(
        &self,
        record: &MemberRecord,
        images: &TemplateImages,
    ) -> Result<Vec<u8>, RenderError> {
        let document = self.template.render(record, images);
        let (width, height) = self.kind().dimensions();
        self.surface
            .mount_and_capture(document, &CaptureOptions::png(width, height))
            .await
    }
}
