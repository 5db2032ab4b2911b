// src/quiz/workflow.rs

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    config::MAX_ANSWER_TOKENS,
    error::QuizError,
    models::{
        answer_key::{AnswerKey, DocumentHandle, TestCode},
        grading_record::UserId,
    },
    quiz::registry::TestRegistry,
};

/// Two-step test registration: the administrator sends the answers first,
/// then the quiz document. Between the two steps the code waits in a
/// per-administrator slot.
pub struct UploadWorkflow {
    admin_id: UserId,
    pending: Mutex<HashMap<UserId, TestCode>>,
}

impl UploadWorkflow {
    pub fn new(admin_id: UserId) -> Self {
        Self {
            admin_id,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user == self.admin_id
    }

    /// Code currently waiting for `admin`'s document, if any.
    pub async fn pending_for(&self, admin: UserId) -> Option<TestCode> {
        self.pending.lock().await.get(&admin).cloned()
    }

    /// Stores the key and puts the requester into the awaiting-document
    /// state. A code already pending for this administrator is replaced.
    pub async fn register_key(
        &self,
        registry: &TestRegistry,
        requester: UserId,
        code: &str,
        answers: &[String],
    ) -> Result<TestCode, QuizError> {
        if !self.is_admin(requester) {
            tracing::warn!("User {} attempted to register an answer key", requester);
            return Err(QuizError::NotAdmin);
        }

        let code = TestCode::parse(code)?;
        let answers: Vec<&str> = answers
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if answers.is_empty() {
            return Err(QuizError::Malformed("/addanswers TEST123 A B 42 Paris"));
        }
        if answers.len() > MAX_ANSWER_TOKENS {
            return Err(QuizError::TooManyAnswers {
                limit: MAX_ANSWER_TOKENS,
            });
        }

        let key = AnswerKey::new(answers.as_slice());
        let items = key.len();
        registry.register_key(&code, key).await?;

        if let Some(previous) = self.pending.lock().await.insert(requester, code.clone()) {
            if previous != code {
                tracing::warn!("Pending upload for {} discarded in favour of {}", previous, code);
            }
        }
        tracing::info!("Answer key for {} registered ({} items), awaiting document", code, items);

        Ok(code)
    }

    /// Binds `handle` to the requester's pending code.
    ///
    /// Documents from anyone but the administrator are not part of the
    /// workflow and yield `Ok(None)`.
    pub async fn attach_document(
        &self,
        registry: &TestRegistry,
        requester: UserId,
        handle: DocumentHandle,
    ) -> Result<Option<TestCode>, QuizError> {
        if !self.is_admin(requester) {
            return Ok(None);
        }

        let mut pending = self.pending.lock().await;
        let code = pending
            .get(&requester)
            .cloned()
            .ok_or(QuizError::NoPendingUpload)?;

        // The slot is only cleared once the document is persisted.
        registry.register_file(&code, handle).await?;
        pending.remove(&requester);
        tracing::info!("Document stored for {}", code);

        Ok(Some(code))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryBackend;

    const ADMIN: UserId = 1;
    const GUEST: UserId = 2;

    fn setup() -> (UploadWorkflow, TestRegistry) {
        (
            UploadWorkflow::new(ADMIN),
            TestRegistry::new(Arc::new(MemoryBackend::default())),
        )
    }

    fn answers(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(String::from).collect()
    }

    #[tokio::test]
    async fn non_admin_cannot_register_keys() {
        let (workflow, registry) = setup();
        let result = workflow
            .register_key(&registry, GUEST, "TEST1", &answers("A B"))
            .await;

        assert!(matches!(result, Err(QuizError::NotAdmin)));
        assert!(matches!(
            registry.get_key(&TestCode::parse("TEST1").unwrap()).await,
            Err(QuizError::UnknownCode(_))
        ));
        assert_eq!(workflow.pending_for(GUEST).await, None);
    }

    #[tokio::test]
    async fn oversized_key_is_refused_after_the_admin_check() {
        let (workflow, registry) = setup();
        let oversized = vec!["A".to_string(); MAX_ANSWER_TOKENS + 1];

        let result = workflow.register_key(&registry, GUEST, "BIG", &oversized).await;
        assert!(matches!(result, Err(QuizError::NotAdmin)));

        let result = workflow.register_key(&registry, ADMIN, "BIG", &oversized).await;
        assert!(matches!(
            result,
            Err(QuizError::TooManyAnswers { limit: MAX_ANSWER_TOKENS })
        ));
        assert_eq!(workflow.pending_for(ADMIN).await, None);
        assert!(registry.get_key(&TestCode::parse("BIG").unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn empty_key_is_rejected_without_state_change() {
        let (workflow, registry) = setup();
        let result = workflow.register_key(&registry, ADMIN, "TEST1", &[]).await;
        assert!(matches!(result, Err(QuizError::Malformed(_))));
        assert_eq!(workflow.pending_for(ADMIN).await, None);
    }

    #[tokio::test]
    async fn key_then_document_registers_the_test() {
        let (workflow, registry) = setup();
        let code = workflow
            .register_key(&registry, ADMIN, "test2", &answers("a b 42"))
            .await
            .unwrap();
        assert_eq!(code.as_str(), "TEST2");
        assert_eq!(workflow.pending_for(ADMIN).await, Some(code.clone()));

        let attached = workflow
            .attach_document(&registry, ADMIN, DocumentHandle("doc-1".into()))
            .await
            .unwrap();

        assert_eq!(attached, Some(code.clone()));
        assert_eq!(workflow.pending_for(ADMIN).await, None);
        assert!(registry.list_codes().await.unwrap().contains(&code));
    }

    #[tokio::test]
    async fn second_key_overwrites_pending_slot() {
        let (workflow, registry) = setup();
        workflow
            .register_key(&registry, ADMIN, "FIRST", &answers("A"))
            .await
            .unwrap();
        workflow
            .register_key(&registry, ADMIN, "SECOND", &answers("B"))
            .await
            .unwrap();

        workflow
            .attach_document(&registry, ADMIN, DocumentHandle("doc".into()))
            .await
            .unwrap();

        let listed = registry.list_codes().await.unwrap();
        assert!(listed.contains(&TestCode::parse("SECOND").unwrap()));
        assert!(!listed.contains(&TestCode::parse("FIRST").unwrap()));
        // The discarded code keeps its key.
        assert!(registry.get_key(&TestCode::parse("FIRST").unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn document_without_pending_code_is_refused() {
        let (workflow, registry) = setup();
        let result = workflow
            .attach_document(&registry, ADMIN, DocumentHandle("doc".into()))
            .await;
        assert!(matches!(result, Err(QuizError::NoPendingUpload)));
    }

    #[tokio::test]
    async fn documents_from_participants_are_ignored() {
        let (workflow, registry) = setup();
        workflow
            .register_key(&registry, ADMIN, "T", &answers("A"))
            .await
            .unwrap();

        let result = workflow
            .attach_document(&registry, GUEST, DocumentHandle("spam".into()))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(workflow.pending_for(ADMIN).await.is_some());
        assert!(registry.list_codes().await.unwrap().is_empty());
    }
}
