//! Read endpoints for applications and the photo/signature intake.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;
use log::{debug, error, info};
use sanitize_filename::sanitize;
use std::io::Write;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::backend::Session;
use crate::imaging::{self, JPEG_MIME, PNG_MIME};
use crate::state::AppState;
use crate::ErrorResponse;

pub const PENDING_CACHE_KEY: &str = "adhesions_en_attente";

/// Pull the first `file` field of a multipart payload into memory, keeping
/// its original (sanitized) filename for format detection.
async fn read_multipart_file(mut payload: Multipart) -> Result<(String, Vec<u8>), String> {
    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        if content_disposition.get_name() != Some("file") {
            continue;
        }
        let filename = content_disposition
            .get_filename()
            .map(sanitize)
            .unwrap_or_else(|| format!("{}.png", Uuid::new_v4()));

        let mut temp_file =
            NamedTempFile::new().map_err(|e| format!("Failed to create temporary file: {e}"))?;
        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            temp_file
                .write_all(&chunk)
                .map_err(|e| format!("Failed to buffer upload: {e}"))?;
        }
        let bytes = std::fs::read(temp_file.path())
            .map_err(|e| format!("Failed to read buffered upload: {e}"))?;
        return Ok((filename, bytes));
    }
    Err("No file was uploaded".to_string())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Adhesion Service",
    get,
    path = "/adhesions",
    responses(
        (status = 200, description = "Pending membership applications", body = Vec<crate::member::model::MemberRecord>),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 502, description = "Backend unreachable", body = ErrorResponse)
    )
)]
pub async fn get_pending_adhesions(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };

    if let Some(records) = state.adhesion_cache.get(PENDING_CACHE_KEY).await {
        debug!("serving pending applications from cache");
        return HttpResponse::Ok().json(records);
    }

    match state.backend.pending_adhesions(&session).await {
        Ok(records) => {
            state
                .adhesion_cache
                .insert(PENDING_CACHE_KEY.to_string(), records.clone())
                .await;
            info!("fetched {} pending applications", records.len());
            HttpResponse::Ok().json(records)
        }
        Err(e) => {
            error!("failed to list pending applications: {e}");
            HttpResponse::BadGateway().json(ErrorResponse::new("BackendError", &e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Adhesion Service",
    get,
    path = "/adhesions/{id}",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "One application", body = crate::member::model::MemberRecord),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 502, description = "Backend unreachable", body = ErrorResponse)
    )
)]
pub async fn get_adhesion(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };
    let id = path.into_inner();
    match state.backend.adhesion(&session, &id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => {
            error!("failed to fetch application {id}: {e}");
            HttpResponse::BadGateway().json(ErrorResponse::new("BackendError", &e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Adhesion Service",
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session status for the caller", body = crate::backend::SessionStatus),
        (status = 401, description = "Missing bearer token", body = ErrorResponse)
    )
)]
pub async fn get_session_status(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };
    match state.backend.session_status(&session).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => {
            error!("failed to fetch session status: {e}");
            HttpResponse::BadGateway().json(ErrorResponse::new("BackendError", &e.to_string()))
        }
    }
}

async fn upload_member_image(
    req: HttpRequest,
    state: web::Data<AppState>,
    member_id: String,
    payload: Multipart,
    folder: &str,
    preserve_alpha: bool,
) -> HttpResponse {
    let session = match Session::from_request(&req) {
        Ok(session) => session,
        Err(_) => {
            return HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Unauthorized", "Missing bearer token"))
        }
    };

    let (filename, bytes) = match read_multipart_file(payload).await {
        Ok(file) => file,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e)),
    };

    // Signatures keep transparency; photos are flattened to JPEG. The
    // declared mime only decides the target codec, decoding sniffs the
    // actual content.
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let keep_alpha = preserve_alpha || mime.as_ref() == PNG_MIME;
    let embedded = match imaging::embed_resized(&bytes, 600, 800, 85, keep_alpha) {
        Ok(embedded) => embedded,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "Unreadable image upload: {e}"
            )))
        }
    };
    debug!(
        "buffered {filename} ({} bytes) as {}",
        bytes.len(),
        if embedded.mime() == JPEG_MIME { "jpeg" } else { "png" }
    );

    let public_id = format!("{folder}/{member_id}");
    match state
        .publisher
        .publish(&session, &embedded, &public_id, folder)
        .await
    {
        Ok(result) => {
            info!("stored member image at {}", result.url);
            HttpResponse::Created().json(result)
        }
        Err(e) => {
            error!("failed to publish member image {public_id}: {e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Adhesion Service",
    post,
    path = "/adhesions/{id}/photo",
    params(("id" = String, Path, description = "Application id")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = crate::artifact::PublishResult),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing bearer token", body = ErrorResponse)
    )
)]
pub async fn upload_member_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    upload_member_image(req, state, path.into_inner(), payload, "photos", false).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Adhesion Service",
    post,
    path = "/adhesions/{id}/signature",
    params(("id" = String, Path, description = "Application id")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Signature stored", body = crate::artifact::PublishResult),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing bearer token", body = ErrorResponse)
    )
)]
pub async fn upload_member_signature(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    upload_member_image(req, state, path.into_inner(), payload, "signatures", true).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/session").route(web::get().to(get_session_status)))
        .service(web::resource("/adhesions").route(web::get().to(get_pending_adhesions)))
        .service(web::resource("/adhesions/{id}").route(web::get().to(get_adhesion)))
        .service(
            web::resource("/adhesions/{id}/photo").route(web::post().to(upload_member_photo)),
        )
        .service(
            web::resource("/adhesions/{id}/signature")
                .route(web::post().to(upload_member_signature)),
        );
}
