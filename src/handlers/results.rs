// src/handlers/results.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::grading_record::LeaderboardEntry,
    quiz::{QuizService, grading::GradeBand},
    utils::jwt::Claims,
};

/// The caller's five most recent results, oldest first.
pub async fn my_results(
    State(service): State<Arc<QuizService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = claims.user_id()?;
    let records = service.my_results(user).await?;

    Ok(Json(records))
}

/// Retrieves the top 5 attempts across all users.
pub async fn get_leaderboard(
    State(service): State<Arc<QuizService>>,
) -> Result<impl IntoResponse, AppError> {
    let leaderboard: Vec<LeaderboardEntry> = service
        .top_users()
        .await?
        .into_iter()
        .map(|(user_id, r)| LeaderboardEntry {
            user_id,
            band: GradeBand::from_percent(r.score).letter(),
            code: r.code,
            score: r.score,
            date: r.date,
        })
        .collect();

    Ok(Json(leaderboard))
}
