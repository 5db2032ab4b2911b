// src/handlers/events.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::event::{BotCommand, EventResponse, InboundEvent},
    notifier::Outbox,
    quiz::{QuizService, dispatch},
    utils::jwt::Claims,
};

/// Handles one chat event forwarded by the gateway.
///
/// The sender is the JWT subject. Domain failures come back as replies with
/// 200 OK; only persistence faults produce an error status.
pub async fn handle_event(
    State(service): State<Arc<QuizService>>,
    Extension(claims): Extension<Claims>,
    Json(event): Json<InboundEvent>,
) -> Result<impl IntoResponse, AppError> {
    let user = claims.user_id()?;
    tracing::debug!("Event from {}: {:?}", user, event);

    let replies = dispatch::handle_event(&service, user, event).await?;

    Ok(Json(EventResponse { replies }))
}

/// Hands the caller's queued private notifications to the gateway.
pub async fn drain_outbox(
    State(outbox): State<Arc<Outbox>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = claims.user_id()?;
    let messages = outbox.drain(user).await;

    Ok(Json(json!({ "messages": messages })))
}

/// Command menu the gateway registers with the chat platform.
pub async fn list_commands() -> impl IntoResponse {
    Json(vec![
        BotCommand {
            command: "start",
            description: "Start the bot",
        },
        BotCommand {
            command: "addanswers",
            description: "Add test answers (admin)",
        },
        BotCommand {
            command: "tests",
            description: "Show the list of tests",
        },
        BotCommand {
            command: "myresults",
            description: "My results",
        },
        BotCommand {
            command: "topusers",
            description: "Top users",
        },
    ])
}
