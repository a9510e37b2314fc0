//! Shared application state: HTTP client, collaborator clients and the
//! assembled document pipeline.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{AssociationApi, MembershipBackend};
use crate::config::AppConfig;
use crate::member::model::MemberRecord;
use crate::pipeline::{DocumentPipeline, SurfaceGenerator};
use crate::publish::{AssetPublisher, CloudinaryStore, ContentStore};
use crate::qr::{QrProvider, QrServerClient};
use crate::render::{
    CardBackTemplate, CardFrontTemplate, FormTemplate, OffscreenSurface, RenderEngine,
    TypstCliEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub backend: Arc<dyn MembershipBackend>,
    pub publisher: Arc<AssetPublisher>,
    pub pipeline: Arc<DocumentPipeline>,
    pub adhesion_cache: Cache<String, Vec<MemberRecord>>,
}

impl AppState {
    pub fn new_with_config(config: &AppConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent("agc-adhesion-server/0.3")
            .build()
            .expect("Failed to create reqwest client");

        let backend: Arc<dyn MembershipBackend> = Arc::new(AssociationApi::new(
            http_client.clone(),
            config.backend.base_url.clone(),
        ));
        let store: Arc<dyn ContentStore> = Arc::new(CloudinaryStore::new(
            http_client.clone(),
            config.store.api_base.clone(),
            config.store.upload_timeout,
        ));
        let qr: Arc<dyn QrProvider> = Arc::new(QrServerClient::new(
            http_client.clone(),
            config.qr.endpoint.clone(),
        ));
        let engine: Arc<dyn RenderEngine> =
            Arc::new(TypstCliEngine::new(config.surface.engine_binary.clone()));

        Self::new_with_components(http_client, backend, store, qr, engine, config)
    }

    /// Assemble state over explicit collaborators; also the test entry
    /// point for mocked backends, stores and engines.
    pub fn new_with_components(
        http_client: reqwest::Client,
        backend: Arc<dyn MembershipBackend>,
        store: Arc<dyn ContentStore>,
        qr: Arc<dyn QrProvider>,
        engine: Arc<dyn RenderEngine>,
        config: &AppConfig,
    ) -> Self {
        let surface = Arc::new(OffscreenSurface::new(engine, config.surface.settle));
        let association = config.association_name.clone();

        let pipeline = Arc::new(DocumentPipeline::new(
            backend.clone(),
            AssetPublisher::new(backend.clone(), store.clone()),
            qr,
            Arc::new(SurfaceGenerator::new(
                FormTemplate::new(association.clone()),
                surface.clone(),
            )),
            Arc::new(SurfaceGenerator::new(
                CardFrontTemplate::new(association.clone()),
                surface.clone(),
            )),
            Arc::new(SurfaceGenerator::new(
                CardBackTemplate::new(association),
                surface,
            )),
            http_client.clone(),
            config.logo_url.clone(),
        ));

        let adhesion_cache = Cache::builder()
            .time_to_live(Duration::from_secs(60))
            .max_capacity(10)
            .build();

        AppState {
            http_client,
            backend: backend.clone(),
            publisher: Arc::new(AssetPublisher::new(backend, store)),
            pipeline,
            adhesion_cache,
        }
    }
}
