//! Trait for document templates.

use super::{MarkupDocument, TemplateImages};
use crate::artifact::ArtifactKind;
use crate::member::model::MemberRecord;

/// A pure markup builder for one document kind.
///
/// `render` must be deterministic for identical inputs, perform no I/O and
/// never fail: missing text fields become empty strings, missing images
/// become placeholder boxes.
pub trait DocumentTemplate: Send + Sync {
    fn kind(&self) -> ArtifactKind;
    fn render(&self, record: &MemberRecord, images: &TemplateImages) -> MarkupDocument;
}
