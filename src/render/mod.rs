//! Document rendering: markup templates, the markup-to-PNG engine and the
//! off-screen surface that hosts a mounted document between captures.

pub mod card_back;
pub mod card_front;
pub mod common;
pub mod engine;
pub mod form;
pub mod surface;
pub mod traits;

pub use card_back::CardBackTemplate;
pub use card_front::CardFrontTemplate;
pub use engine::{RenderEngine, TypstCliEngine};
pub use form::FormTemplate;
pub use surface::{CaptureFormat, CaptureOptions, OffscreenSurface};
pub use traits::DocumentTemplate;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::imaging::EmbeddableImage;

/// Errors raised while turning markup into a raster image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Capture was requested with no document mounted.
    #[error("rendering surface unavailable")]
    SurfaceUnavailable,
    #[error("failed to prepare markup workspace: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("markup engine execution failed: {0}")]
    EngineIo(#[source] std::io::Error),
    #[error("markup engine exited with status {0}")]
    EngineExit(i32),
    #[error("failed to read captured image: {0}")]
    ReadCapture(#[source] std::io::Error),
}

/// A layout description ready for the rendering engine, together with the
/// raster assets the markup references by file name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupDocument {
    pub source: String,
    pub attachments: BTreeMap<String, Vec<u8>>,
}

impl MarkupDocument {
    pub fn new(source: String) -> Self {
        Self {
            source,
            attachments: BTreeMap::new(),
        }
    }

    pub fn attach(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.attachments.insert(name.into(), bytes);
    }
}

/// Images available to a template. Every slot is optional: templates
/// substitute a labeled placeholder box instead of failing.
#[derive(Debug, Clone, Default)]
pub struct TemplateImages {
    pub logo: Option<EmbeddableImage>,
    pub subject_photo: Option<EmbeddableImage>,
    pub signature: Option<EmbeddableImage>,
    pub counter_signature: Option<EmbeddableImage>,
    pub qr_code: Option<EmbeddableImage>,
}
