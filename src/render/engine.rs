//! Markup rendering engine.
//!
//! The production engine writes the markup document and its attachments
//! into a temporary compile workspace and invokes the Typst CLI to produce
//! a PNG at 72ppi, where one typographic point maps to one pixel — page
//! sizes in the templates are therefore pixel sizes.

use async_trait::async_trait;

use super::{MarkupDocument, RenderError};

#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render the document to PNG bytes at the given canvas size.
    async fn render_png(
        &self,
        document: &MarkupDocument,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError>;
}

pub struct TypstCliEngine {
    binary: String,
}

impl TypstCliEngine {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl RenderEngine for TypstCliEngine {
    async fn render_png(
        &self,
        document: &MarkupDocument,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let workspace = tempfile::tempdir().map_err(RenderError::Workspace)?;

        let source_path = workspace.path().join("document.typ");
        tokio::fs::write(&source_path, &document.source)
            .await
            .map_err(RenderError::Workspace)?;

        for (name, bytes) in &document.attachments {
            // Attachment names are template-internal; anything that tries
            // to leave the workspace is skipped.
            if name.contains('/') || name.contains('\\') || name.contains("..") {
                log::warn!("skipping attachment with unsafe name '{name}'");
                continue;
            }
            tokio::fs::write(workspace.path().join(name), bytes)
                .await
                .map_err(RenderError::Workspace)?;
        }

        let output_path = workspace.path().join("document.png");
        let status = tokio::process::Command::new(&self.binary)
            .arg("compile")
            .arg("--format")
            .arg("png")
            .arg("--ppi")
            .arg("72")
            .arg(&source_path)
            .arg(&output_path)
            .current_dir(workspace.path())
            .status()
            .await
            .map_err(RenderError::EngineIo)?;

        if !status.success() {
            return Err(RenderError::EngineExit(status.code().unwrap_or(-1)));
        }

        let bytes = tokio::fs::read(&output_path)
            .await
            .map_err(RenderError::ReadCapture)?;
        log::debug!(
            "captured {width}x{height} document ({} bytes of PNG)",
            bytes.len()
        );
        Ok(bytes)
    }
}
