//! Approval, rejection and artifact regeneration.
//!
//! Pipeline errors are never swallowed: they come back as explicit error
//! bodies so the operator's confirmation dialog can stay open and offer a
//! retry. A failure after the backend approval call is reported with its
//! own error type, because at that point the member is approved and only
//! the documents are stale.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::artifact::{ArtifactKind, DocumentArtifact};
use crate::backend::Session;
use crate::member::handlers::PENDING_CACHE_KEY;
use crate::member::validation::validate_member_record;
use crate::pipeline::PipelineError;
use crate::state::AppState;
use crate::ErrorResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprobationRequest {
    #[serde(default)]
    pub commentaire: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejetRequest {
    pub motif: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApprobationResponse {
    pub numero_membre: String,
    pub artefacts: Vec<DocumentArtifact>,
}

fn pipeline_error_response(e: &PipelineError) -> HttpResponse {
    if e.occurred_after_approval() {
        // State-mutating call already succeeded; no automatic rollback
        // exists. Point the operator at the regeneration action.
        HttpResponse::InternalServerError().json(ErrorResponse::new(
            "ArtifactsStale",
            &format!(
                "Le dossier est approuvé mais les documents n'ont pas tous été \
                 régénérés ({e}). Relancez la régénération des documents du membre."
            ),
        ))
    } else {
        HttpResponse::BadGateway().json(ErrorResponse::new("PipelineError", &e.to_string()))
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Approval Service",
    post,
    path = "/adhesions/{id}/approbation",
    params(("id" = String, Path, description = "Application id")),
    request_body = ApprobationRequest,
    responses(
        (status = 200, description = "Application approved, documents published", body = ApprobationResponse),
        (status = 400, description = "Record fails validation", body = ErrorResponse),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 500, description = "Approved but artifacts stale", body = ErrorResponse),
        (status = 502, description = "Pipeline aborted before approval", body = ErrorResponse)
    )
)]
pub async fn approve_adhesion(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ApprobationRequest>,
) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };
    let id = path.into_inner();

    let record = match state.backend.adhesion(&session, &id).await {
        Ok(record) => record,
        Err(e) => {
            error!("failed to fetch application {id}: {e}");
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("BackendError", &e.to_string()));
        }
    };

    if let Err(message) = validate_member_record(&record) {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }

    info!("approving application {id}");
    match state
        .pipeline
        .approve(&session, record, &body.commentaire, CancellationToken::new())
        .await
    {
        Ok(outcome) => {
            state.adhesion_cache.invalidate(PENDING_CACHE_KEY).await;
            info!(
                "application {id} approved with number {}",
                outcome.membership_number
            );
            HttpResponse::Ok().json(ApprobationResponse {
                numero_membre: outcome.membership_number,
                artefacts: outcome.artifacts,
            })
        }
        Err(e) => {
            error!("approval pipeline failed for {id}: {e}");
            pipeline_error_response(&e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Approval Service",
    post,
    path = "/adhesions/{id}/rejet",
    params(("id" = String, Path, description = "Application id")),
    request_body = RejetRequest,
    responses(
        (status = 200, description = "Application rejected"),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 502, description = "Backend unreachable", body = ErrorResponse)
    )
)]
pub async fn reject_adhesion(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RejetRequest>,
) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };
    let id = path.into_inner();
    match state.backend.reject(&session, &id, &body.motif).await {
        Ok(()) => {
            state.adhesion_cache.invalidate(PENDING_CACHE_KEY).await;
            info!("application {id} rejected");
            HttpResponse::Ok().finish()
        }
        Err(e) => {
            error!("failed to reject application {id}: {e}");
            HttpResponse::BadGateway().json(ErrorResponse::new("BackendError", &e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Approval Service",
    post,
    path = "/adhesions/{id}/artefacts/{kind}",
    params(
        ("id" = String, Path, description = "Application id"),
        ("kind" = String, Path, description = "formulaire | recto | verso")
    ),
    responses(
        (status = 200, description = "Regenerated artifacts", body = Vec<DocumentArtifact>),
        (status = 400, description = "Unknown artifact kind", body = ErrorResponse),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 502, description = "Regeneration failed", body = ErrorResponse)
    )
)]
pub async fn regenerate_artifact(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };
    let (id, kind_raw) = path.into_inner();
    let kind: ArtifactKind = match kind_raw.parse() {
        Ok(kind) => kind,
        Err(message) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
    };

    let record = match state.backend.adhesion(&session, &id).await {
        Ok(record) => record,
        Err(e) => {
            error!("failed to fetch application {id}: {e}");
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("BackendError", &e.to_string()));
        }
    };

    info!("regenerating {kind} for application {id}");
    match state
        .pipeline
        .regenerate(&session, record, &[kind], CancellationToken::new())
        .await
    {
        Ok(artifacts) => HttpResponse::Ok().json(artifacts),
        Err(e) => {
            error!("regeneration failed for {id}: {e}");
            HttpResponse::BadGateway().json(ErrorResponse::new("PipelineError", &e.to_string()))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/adhesions/{id}/approbation").route(web::post().to(approve_adhesion)),
    )
    .service(web::resource("/adhesions/{id}/rejet").route(web::post().to(reject_adhesion)))
    .service(
        web::resource("/adhesions/{id}/artefacts/{kind}")
            .route(web::post().to(regenerate_artifact)),
    );
}
