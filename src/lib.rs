use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod adhesion;
pub mod artifact;
pub mod backend;
pub mod config;
pub mod imaging;
pub mod member;
pub mod metrics;
pub mod pipeline;
pub mod publish;
pub mod qr;
pub mod render;
pub mod state;

pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::member::handlers::get_pending_adhesions,
            crate::member::handlers::get_adhesion,
            crate::member::handlers::get_session_status,
            crate::member::handlers::upload_member_photo,
            crate::member::handlers::upload_member_signature,
            crate::adhesion::handlers::approve_adhesion,
            crate::adhesion::handlers::reject_adhesion,
            crate::adhesion::handlers::regenerate_artifact
        ),
        components(
            schemas(
                ErrorResponse,
                member::model::MemberRecord,
                member::model::ApprovalState,
                backend::SessionStatus,
                artifact::ArtifactKind,
                artifact::Revision,
                artifact::PublishResult,
                artifact::DocumentArtifact,
                adhesion::handlers::ApprobationRequest,
                adhesion::handlers::RejetRequest,
                adhesion::handlers::ApprobationResponse,
            )
        ),
        tags(
            (name = "Adhesion Service", description = "Application listing and member image intake."),
            (name = "Approval Service", description = "Approval, rejection and document regeneration.")
        )
    )]
    struct ApiDoc;

    let app_config = match crate::config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration. Check the AGC_* variables in .env. Error: {e}");
            std::process::exit(1);
        }
    };
    let app_state = web::Data::new(AppState::new_with_config(&app_config));

    let prometheus = PrometheusMetricsBuilder::new("agc_adhesion_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .configure(member::handlers::config)
                    .configure(adhesion::handlers::config),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .backlog(8192)
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
