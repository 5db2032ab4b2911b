// src/quiz/registry.rs

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    error::{QuizError, StoreError},
    models::answer_key::{AnswerKey, DocumentHandle, TestCode},
    store::{KeyedStore, SnapshotBackend},
};

/// Answer keys and quiz documents, both keyed by test code.
///
/// The two mappings are written in separate steps, so a code can have a key
/// without a document for a while. Only codes with a document are listed.
pub struct TestRegistry {
    keys: KeyedStore<TestCode, AnswerKey>,
    files: KeyedStore<TestCode, DocumentHandle>,
}

impl TestRegistry {
    pub fn new(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self {
            keys: KeyedStore::new(backend.clone(), "answers"),
            files: KeyedStore::new(backend, "files"),
        }
    }

    /// Stores `key` for `code`, replacing any earlier key.
    pub async fn register_key(&self, code: &TestCode, key: AnswerKey) -> Result<(), StoreError> {
        self.keys
            .update(|keys| {
                keys.insert(code.clone(), key);
            })
            .await
    }

    pub async fn get_key(&self, code: &TestCode) -> Result<AnswerKey, QuizError> {
        self.keys
            .get(code)
            .await?
            .ok_or_else(|| QuizError::UnknownCode(code.clone()))
    }

    /// Binds `handle` to `code`, replacing any earlier document.
    pub async fn register_file(
        &self,
        code: &TestCode,
        handle: DocumentHandle,
    ) -> Result<(), StoreError> {
        self.files
            .update(|files| {
                files.insert(code.clone(), handle);
            })
            .await
    }

    pub async fn get_file(&self, code: &TestCode) -> Result<DocumentHandle, QuizError> {
        self.files
            .get(code)
            .await?
            .ok_or_else(|| QuizError::DocumentNotFound(code.clone()))
    }

    pub async fn list_codes(&self) -> Result<BTreeSet<TestCode>, StoreError> {
        Ok(self.files.load().await?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn code(s: &str) -> TestCode {
        TestCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn codes_without_document_are_not_listed() {
        let registry = TestRegistry::new(Arc::new(MemoryBackend::default()));
        registry
            .register_key(&code("math1"), AnswerKey::new(&["A"]))
            .await
            .unwrap();
        assert!(registry.list_codes().await.unwrap().is_empty());

        registry
            .register_file(&code("MATH1"), DocumentHandle("file-1".into()))
            .await
            .unwrap();
        let listed: Vec<_> = registry.list_codes().await.unwrap().into_iter().collect();
        assert_eq!(listed, vec![code("MATH1")]);
    }

    #[tokio::test]
    async fn later_registrations_replace_earlier_ones() {
        let registry = TestRegistry::new(Arc::new(MemoryBackend::default()));
        let c = code("T1");
        registry.register_key(&c, AnswerKey::new(&["A", "B"])).await.unwrap();
        registry.register_key(&c, AnswerKey::new(&["C"])).await.unwrap();
        registry.register_file(&c, DocumentHandle("old".into())).await.unwrap();
        registry.register_file(&c, DocumentHandle("new".into())).await.unwrap();

        assert_eq!(registry.get_key(&c).await.unwrap(), AnswerKey::new(&["C"]));
        assert_eq!(registry.get_file(&c).await.unwrap(), DocumentHandle("new".into()));
    }

    #[tokio::test]
    async fn lookups_of_unknown_codes_fail_distinctly() {
        let registry = TestRegistry::new(Arc::new(MemoryBackend::default()));
        assert!(matches!(
            registry.get_key(&code("NOPE")).await,
            Err(QuizError::UnknownCode(_))
        ));
        assert!(matches!(
            registry.get_file(&code("NOPE")).await,
            Err(QuizError::DocumentNotFound(_))
        ));
    }
}
