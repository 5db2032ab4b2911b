// src/models/answer_key.rs

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::QuizError;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_-]{1,32}$").expect("static regex"));

/// Letters graded as multiple-choice items.
pub const CHOICE_ALPHABET: [char; 4] = ['A', 'B', 'C', 'D'];

/// Identifier of one quiz. Always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCode(String);

impl TestCode {
    /// Normalizes user input into a code, rejecting anything that is not a
    /// single short word.
    pub fn parse(raw: &str) -> Result<Self, QuizError> {
        let normalized = raw.trim().to_uppercase();
        if !CODE_PATTERN.is_match(&normalized) {
            return Err(QuizError::InvalidCode(raw.trim().to_string()));
        }
        Ok(TestCode(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque file reference issued by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHandle(pub String);

/// One expected answer, classified once when the key is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerToken {
    /// One of the `CHOICE_ALPHABET` letters, stored uppercase.
    Choice(char),
    /// Any other answer: a number, a word, a short phrase.
    Open(String),
}

impl AnswerToken {
    pub fn classify(raw: &str) -> Self {
        let token = raw.trim().to_uppercase();
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if CHOICE_ALPHABET.contains(&c) => AnswerToken::Choice(c),
            _ => AnswerToken::Open(token),
        }
    }

    /// Whether `submitted` answers this item.
    ///
    /// Choice items compare case-insensitively; open items additionally ignore
    /// surrounding whitespace.
    pub fn accepts(&self, submitted: &str) -> bool {
        match self {
            AnswerToken::Choice(letter) => submitted.to_uppercase() == letter.to_string(),
            AnswerToken::Open(expected) => {
                submitted.trim().to_lowercase() == expected.trim().to_lowercase()
            }
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            AnswerToken::Choice(c) => c.to_string(),
            AnswerToken::Open(s) => s.clone(),
        }
    }
}

/// Persisted form of the answers field.
/// Older snapshots stored the whole key as one space-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredAnswers {
    Tokens(Vec<String>),
    Legacy(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredKey {
    answers: StoredAnswers,
}

/// Ordered expected answers for a test code.
/// The length is fixed at registration and every submission must match it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredKey", into = "StoredKey")]
pub struct AnswerKey {
    tokens: Vec<AnswerToken>,
}

impl AnswerKey {
    pub fn new<S: AsRef<str>>(raw: &[S]) -> Self {
        Self {
            tokens: raw.iter().map(|t| AnswerToken::classify(t.as_ref())).collect(),
        }
    }

    pub fn tokens(&self) -> &[AnswerToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<StoredKey> for AnswerKey {
    fn from(stored: StoredKey) -> Self {
        match stored.answers {
            StoredAnswers::Tokens(tokens) => AnswerKey::new(tokens.as_slice()),
            StoredAnswers::Legacy(line) => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                AnswerKey::new(tokens.as_slice())
            }
        }
    }
}

impl From<AnswerKey> for StoredKey {
    fn from(key: AnswerKey) -> Self {
        StoredKey {
            answers: StoredAnswers::Tokens(key.tokens.iter().map(AnswerToken::as_text).collect()),
        }
    }
}

/// DTO for registering an answer key.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterKeyRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 answers."))]
    pub answers: Vec<String>,
}

/// DTO for attaching the quiz document to the pending code.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1, max = 512))]
    pub file_id: String,
}
