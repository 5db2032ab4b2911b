// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::answer_key::{DocumentHandle, RegisterKeyRequest, UploadDocumentRequest},
    quiz::QuizService,
    utils::jwt::Claims,
};

/// Registers the answer key for a test code and waits for its document.
/// Admin only.
pub async fn register_key(
    State(service): State<Arc<QuizService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RegisterKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let admin = claims.user_id()?;
    let code = service
        .register_key(admin, &payload.code, &payload.answers)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "code": code,
            "awaiting_document": true,
        })),
    ))
}

/// Attaches the quiz document to the pending test code.
/// Admin only.
pub async fn upload_document(
    State(service): State<Arc<QuizService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UploadDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let admin = claims.user_id()?;
    let code = service
        .upload_document(admin, DocumentHandle(payload.file_id))
        .await?
        .ok_or_else(|| AppError::Forbidden("Only the administrator can upload tests".to_string()))?;

    Ok((StatusCode::CREATED, Json(json!({ "code": code }))))
}
