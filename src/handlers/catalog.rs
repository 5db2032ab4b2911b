// src/handlers/catalog.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::grading_record::{SubmissionResponse, SubmitAnswersRequest},
    quiz::{QuizService, render},
    utils::jwt::Claims,
};

/// Lists the codes of tests whose document has been uploaded.
pub async fn list_tests(
    State(service): State<Arc<QuizService>>,
) -> Result<impl IntoResponse, AppError> {
    let codes = service.list_tests().await?;

    Ok(Json(codes))
}

/// Returns the document handle of a test plus answering instructions.
pub async fn get_document(
    State(service): State<Arc<QuizService>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (code, handle) = service.document(&code).await?;
    let caption = render::document_caption(&code);

    Ok(Json(json!({
        "code": code,
        "file_id": handle,
        "caption": caption,
    })))
}

/// Grades a submission for the caller.
///
/// The record is stored even if the private notification cannot be
/// delivered; `delivered` tells the client which acknowledgement applies.
pub async fn submit_answers(
    State(service): State<Arc<QuizService>>,
    Extension(claims): Extension<Claims>,
    Path(code): Path<String>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = claims.user_id()?;
    let submission = service
        .submit(user, &code, payload.answers.as_slice())
        .await?;
    let message = if submission.delivered {
        render::RESULT_READY
    } else {
        render::START_FIRST
    };

    Ok(Json(SubmissionResponse {
        code: submission.code,
        correct: submission.score.correct,
        total: submission.score.total,
        percent: submission.score.percent,
        band: submission.score.band().letter(),
        delivered: submission.delivered,
        message: message.to_string(),
    }))
}
