// src/quiz/dispatch.rs

use crate::{
    error::{QuizError, StoreError},
    models::{
        answer_key::DocumentHandle,
        event::{InboundEvent, Outbound},
        grading_record::UserId,
    },
    quiz::{QuizService, render},
};

/// Splits a free-text submission `CODE tok tok ...` into code and answers.
pub fn parse_submission(text: &str) -> Result<(&str, Vec<&str>), QuizError> {
    let mut parts = text.split_whitespace();
    let code = parts
        .next()
        .ok_or(QuizError::Malformed(render::SUBMISSION_HINT))?;
    let answers: Vec<&str> = parts.collect();
    if answers.is_empty() {
        return Err(QuizError::Malformed(render::SUBMISSION_HINT));
    }
    Ok((code, answers))
}

/// Handles one chat event from `user` and returns what to send back.
///
/// Domain failures become replies. Only store failures escape, since they
/// are the one condition the user cannot correct.
pub async fn handle_event(
    service: &QuizService,
    user: UserId,
    event: InboundEvent,
) -> Result<Vec<Outbound>, StoreError> {
    let outcome = match event {
        InboundEvent::Start => {
            service.start(user).await;
            Ok(vec![Outbound::reply(render::GREETING)])
        }
        InboundEvent::RegisterKey { code, answers } => service
            .register_key(user, &code, &answers)
            .await
            .map(|_| vec![Outbound::reply(render::ANSWERS_SAVED)]),
        InboundEvent::ListTests => list_tests(service).await.map_err(QuizError::from),
        InboundEvent::RequestDocument { code } => send_document(service, &code).await,
        InboundEvent::Button { data } => match data.strip_prefix(render::SEND_PREFIX) {
            Some(code) => send_document(service, code).await,
            None => Ok(Vec::new()),
        },
        InboundEvent::Text { text } => match parse_submission(&text) {
            Ok((code, answers)) => submit(service, user, code, answers.as_slice()).await,
            Err(e) => Err(e),
        },
        InboundEvent::SubmitAnswers { code, answers } => {
            if code.trim().is_empty() || answers.is_empty() {
                Err(QuizError::Malformed(render::SUBMISSION_HINT))
            } else {
                submit(service, user, code.trim(), answers.as_slice()).await
            }
        }
        InboundEvent::MyResults => my_results(service, user).await.map_err(QuizError::from),
        InboundEvent::TopUsers => top_users(service).await.map_err(QuizError::from),
        InboundEvent::UploadDocument { file_id } => service
            .upload_document(user, DocumentHandle(file_id))
            .await
            .map(|attached| match attached {
                Some(code) => vec![Outbound::reply(render::document_stored(&code))],
                None => Vec::new(),
            }),
    };

    match outcome {
        Ok(replies) => Ok(replies),
        Err(QuizError::Store(e)) => {
            tracing::error!("Store failure while handling event from {}: {}", user, e);
            Err(e)
        }
        Err(e) => Ok(vec![Outbound::reply(e.to_string())]),
    }
}

async fn list_tests(service: &QuizService) -> Result<Vec<Outbound>, StoreError> {
    let codes = service.list_tests().await?;
    if codes.is_empty() {
        return Ok(vec![Outbound::reply(render::NO_TESTS)]);
    }
    Ok(vec![Outbound::TestList {
        title: render::TEST_LIST_TITLE.to_string(),
        codes: codes.into_iter().map(|c| c.to_string()).collect(),
    }])
}

async fn send_document(service: &QuizService, code: &str) -> Result<Vec<Outbound>, QuizError> {
    let (code, handle) = service.document(code).await?;
    Ok(vec![Outbound::Document {
        file_id: handle.0,
        caption: render::document_caption(&code),
    }])
}

async fn submit<S: AsRef<str> + Sync>(
    service: &QuizService,
    user: UserId,
    code: &str,
    answers: &[S],
) -> Result<Vec<Outbound>, QuizError> {
    let submission = service.submit(user, code, answers).await?;
    let ack = if submission.delivered {
        render::RESULT_READY
    } else {
        render::START_FIRST
    };
    Ok(vec![Outbound::reply(ack)])
}

async fn my_results(service: &QuizService, user: UserId) -> Result<Vec<Outbound>, StoreError> {
    let records = service.my_results(user).await?;
    if records.is_empty() {
        return Ok(vec![Outbound::reply(render::NO_RESULTS)]);
    }
    Ok(vec![Outbound::reply(render::recent_results(&records))])
}

async fn top_users(service: &QuizService) -> Result<Vec<Outbound>, StoreError> {
    let board = service.top_users().await?;
    if board.is_empty() {
        return Ok(vec![Outbound::reply(render::NOBODY_TESTED)]);
    }
    Ok(vec![Outbound::reply(render::leaderboard(&board))])
}
