// src/models/grading_record.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::answer_key::TestCode;

/// Chat user identity as issued by the transport.
pub type UserId = i64;

/// Outcome of one graded submission.
/// Stored in the submitting user's ledger entry and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingRecord {
    pub code: TestCode,

    /// Rounded percent score, 0..=100.
    pub score: u32,

    pub correct: usize,
    pub total: usize,

    /// Local time of grading, minute precision.
    #[serde(with = "minute_format")]
    pub date: NaiveDateTime,

    /// Ledger-wide append counter. Older snapshots lack it and load as 0.
    #[serde(default)]
    pub seq: u64,
}

/// One leaderboard line: an individual attempt and who made it.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub code: TestCode,
    pub score: u32,
    pub band: &'static str,
    #[serde(with = "minute_format")]
    pub date: NaiveDateTime,
}

/// Response body of a graded submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub code: TestCode,
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
    pub band: &'static str,
    /// Whether the private notification reached the user.
    pub delivered: bool,
    pub message: String,
}

/// DTO for submitting answers outside the free-text channel.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 answers."))]
    pub answers: Vec<String>,
}

/// `"%Y-%m-%d %H:%M"`, the format the results snapshot has always used.
pub mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
