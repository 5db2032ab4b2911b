// src/quiz/mod.rs

//! Test registry, admin upload workflow, grading and results.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::{
    config::{HISTORY_LIMIT, LEADERBOARD_LIMIT, MAX_ANSWER_TOKENS},
    error::{QuizError, StoreError},
    models::{
        answer_key::{DocumentHandle, TestCode},
        grading_record::{GradingRecord, UserId},
    },
    notifier::Notifier,
    store::SnapshotBackend,
};

pub mod dispatch;
pub mod grading;
pub mod ledger;
pub mod registry;
pub mod render;
pub mod workflow;

use grading::Score;
use ledger::ResultsLedger;
use registry::TestRegistry;
use workflow::UploadWorkflow;

/// A graded and recorded submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub code: TestCode,
    pub score: Score,
    pub record: GradingRecord,
    /// Whether the private notification reached the user.
    pub delivered: bool,
}

/// Entry point for every operation the chat front end can trigger.
pub struct QuizService {
    registry: TestRegistry,
    workflow: UploadWorkflow,
    ledger: ResultsLedger,
    notifier: Arc<dyn Notifier>,
}

impl QuizService {
    pub fn new(
        backend: Arc<dyn SnapshotBackend>,
        admin_id: UserId,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry: TestRegistry::new(backend.clone()),
            workflow: UploadWorkflow::new(admin_id),
            ledger: ResultsLedger::new(backend),
            notifier,
        }
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    pub async fn start(&self, user: UserId) {
        self.notifier.open(user).await;
    }

    pub async fn register_key(
        &self,
        requester: UserId,
        code: &str,
        answers: &[String],
    ) -> Result<TestCode, QuizError> {
        self.workflow
            .register_key(&self.registry, requester, code, answers)
            .await
    }

    pub async fn upload_document(
        &self,
        requester: UserId,
        handle: DocumentHandle,
    ) -> Result<Option<TestCode>, QuizError> {
        self.workflow
            .attach_document(&self.registry, requester, handle)
            .await
    }

    pub async fn list_tests(&self) -> Result<Vec<TestCode>, StoreError> {
        Ok(self.registry.list_codes().await?.into_iter().collect())
    }

    pub async fn document(&self, code: &str) -> Result<(TestCode, DocumentHandle), QuizError> {
        let code = TestCode::parse(code)?;
        let handle = self.registry.get_file(&code).await?;
        Ok((code, handle))
    }

    /// Grades `answers` against the key of `code`, records the outcome and
    /// tries to notify the user privately.
    ///
    /// Nothing is recorded unless grading succeeds. A failed notification
    /// does not undo the record.
    pub async fn submit<S: AsRef<str>>(
        &self,
        user: UserId,
        code: &str,
        answers: &[S],
    ) -> Result<Submission, QuizError> {
        if answers.len() > MAX_ANSWER_TOKENS {
            return Err(QuizError::TooManyAnswers {
                limit: MAX_ANSWER_TOKENS,
            });
        }
        let code = TestCode::parse(code)?;
        let key = self.registry.get_key(&code).await?;
        let score = grading::grade(&key, answers)?;

        let record = self
            .ledger
            .append(
                user,
                GradingRecord {
                    code: code.clone(),
                    score: score.percent,
                    correct: score.correct,
                    total: score.total,
                    date: now_to_minute(),
                    seq: 0,
                },
            )
            .await?;
        tracing::info!(
            "User {} scored {}/{} ({}%) on {}",
            user,
            score.correct,
            score.total,
            score.percent,
            code
        );

        let text = render::score_notification(&code, &score);
        let delivered = match self.notifier.notify(user, &text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Result for {} not delivered: {}", code, e);
                false
            }
        };

        Ok(Submission {
            code,
            score,
            record,
            delivered,
        })
    }

    pub async fn my_results(&self, user: UserId) -> Result<Vec<GradingRecord>, StoreError> {
        self.ledger.recent_for(user, HISTORY_LIMIT).await
    }

    pub async fn top_users(&self) -> Result<Vec<(UserId, GradingRecord)>, StoreError> {
        self.ledger.leaderboard(LEADERBOARD_LIMIT).await
    }
}

fn now_to_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notifier::Outbox, store::MemoryBackend};

    const ADMIN: UserId = 100;

    async fn service_with_test(outbox: Arc<Outbox>) -> QuizService {
        let service = QuizService::new(Arc::new(MemoryBackend::default()), ADMIN, outbox);
        let answers: Vec<String> = ["A", "B", "42", "Paris"].map(String::from).to_vec();
        service.register_key(ADMIN, "TEST1", &answers).await.unwrap();
        service
            .upload_document(ADMIN, DocumentHandle("doc".into()))
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn submission_is_recorded_and_notified() {
        let outbox = Arc::new(Outbox::default());
        let service = service_with_test(outbox.clone()).await;
        service.start(7).await;

        let submission = service.submit(7, "test1", &["A", "B", "42", "paris"]).await.unwrap();

        assert_eq!(submission.score.percent, 100);
        assert!(submission.delivered);
        assert_eq!(service.my_results(7).await.unwrap().len(), 1);
        let inbox = outbox.drain(7).await;
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].contains("4/4"));
    }

    #[tokio::test]
    async fn undelivered_result_is_still_recorded() {
        let outbox = Arc::new(Outbox::default());
        let service = service_with_test(outbox).await;

        let submission = service.submit(8, "TEST1", &["A", "C", "42", "Paris"]).await.unwrap();

        assert!(!submission.delivered);
        assert_eq!(submission.record.score, 75);
        assert_eq!(service.my_results(8).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_submissions_leave_ledger_untouched() {
        let service = service_with_test(Arc::new(Outbox::default())).await;

        assert!(matches!(
            service.submit(9, "TEST1", &["A", "B", "42"]).await,
            Err(QuizError::LengthMismatch { expected: 4, received: 3 })
        ));
        assert!(matches!(
            service.submit(9, "NOPE", &["A"]).await,
            Err(QuizError::UnknownCode(_))
        ));
        assert!(service.my_results(9).await.unwrap().is_empty());
        assert!(service.top_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_submission_is_refused_before_grading() {
        let service = service_with_test(Arc::new(Outbox::default())).await;
        let answers = vec!["A"; MAX_ANSWER_TOKENS + 1];

        assert!(matches!(
            service.submit(9, "TEST1", answers.as_slice()).await,
            Err(QuizError::TooManyAnswers { limit: MAX_ANSWER_TOKENS })
        ));
        assert!(service.my_results(9).await.unwrap().is_empty());
    }
}
