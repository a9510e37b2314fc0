//! Off-screen rendering surface.
//!
//! Hosts one mounted markup document at a time and rasterizes it on
//! capture. The surface is shared between the three document generators of
//! a pipeline run (and potentially between runs), so the mounted slot sits
//! behind an async mutex: only one capture is ever in flight, and mounting
//! fully replaces the previous document before the next capture can
//! observe it.
//!
//! The engine reports completion explicitly, which is the real paint
//! barrier. An optional settle delay is kept as a safety margin for
//! engines without a trustworthy completion signal; it defaults to zero.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::engine::RenderEngine;
use super::{MarkupDocument, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Png,
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    pub format: CaptureFormat,
    pub quality: u8,
}

impl CaptureOptions {
    pub fn png(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: CaptureFormat::Png,
            quality: 100,
        }
    }
}

pub struct OffscreenSurface {
    engine: Arc<dyn RenderEngine>,
    settle: Duration,
    slot: Mutex<Option<MarkupDocument>>,
}

impl OffscreenSurface {
    pub fn new(engine: Arc<dyn RenderEngine>, settle: Duration) -> Self {
        Self {
            engine,
            settle,
            slot: Mutex::new(None),
        }
    }

    /// Mount a document, discarding any previously mounted content.
    pub async fn mount(&self, document: MarkupDocument) {
        let mut slot = self.slot.lock().await;
        *slot = Some(document);
    }

    /// Rasterize the mounted document.
    ///
    /// Fails with [`RenderError::SurfaceUnavailable`] when nothing is
    /// mounted. Capturing before the engine finished a previous pass is
    /// impossible: the slot lock is held for the whole render.
    pub async fn capture(&self, options: &CaptureOptions) -> Result<Vec<u8>, RenderError> {
        let slot = self.slot.lock().await;
        let document = slot.as_ref().ok_or(RenderError::SurfaceUnavailable)?;
        self.settle_barrier().await;
        self.engine
            .render_png(document, options.width, options.height)
            .await
    }

    /// Mount and capture as one atomic operation, so concurrent users of a
    /// shared surface cannot interleave a foreign mount between the two.
    pub async fn mount_and_capture(
        &self,
        document: MarkupDocument,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let mut slot = self.slot.lock().await;
        self.settle_barrier().await;
        let result = self
            .engine
            .render_png(&document, options.width, options.height)
            .await;
        *slot = Some(document);
        result
    }

    async fn settle_barrier(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }
}
