// src/quiz/render.rs

//! Chat-facing wording of the core's outcomes.

use std::fmt::Write;

use crate::{
    models::{
        answer_key::TestCode,
        grading_record::{GradingRecord, UserId, minute_format},
    },
    quiz::grading::{GradeBand, Score},
};

pub const GREETING: &str = "👋 Welcome to the bot!";
pub const SUBMISSION_HINT: &str = "TEST123 A B 42 Paris";
pub const TEST_LIST_TITLE: &str = "📚 Available tests:";
pub const NO_TESTS: &str = "📂 No tests available yet.";
pub const NO_RESULTS: &str = "📭 You have no results yet.";
pub const NOBODY_TESTED: &str = "⛔ Nobody has taken a test yet.";
pub const RESULT_READY: &str = "📬 Your result is ready";
pub const START_FIRST: &str = "⚠️ Start the bot with /start first, then your result will be sent privately.";
pub const ANSWERS_SAVED: &str = "✅ Answers saved. Now send the test file.";

pub const SEND_PREFIX: &str = "SEND_";

pub fn document_stored(code: &TestCode) -> String {
    format!("📎 File saved: {}", code)
}

/// Instructions sent together with a quiz document.
pub fn document_caption(code: &TestCode) -> String {
    format!(
        "📘 Test code: `{code}`\n✏️ Send your answers like this:\n`{code} ABCD...`"
    )
}

/// Private notification after a graded submission.
pub fn score_notification(code: &TestCode, score: &Score) -> String {
    format!(
        "📨 Your test result:\n📘 Test: {}\n✅ Correct: {}/{}\n📊 Score: {}%\n📈 Grade: {}",
        code,
        score.correct,
        score.total,
        score.percent,
        score.band().label()
    )
}

pub fn recent_results(records: &[GradingRecord]) -> String {
    let mut text = String::from("📌 Recent results:\n\n");
    for r in records {
        let _ = write!(
            text,
            "🧾 {} — {}% {}\n📅 {}\n\n",
            r.code,
            r.score,
            GradeBand::from_percent(r.score).label(),
            r.date.format(minute_format::FORMAT)
        );
    }
    text
}

pub fn leaderboard(entries: &[(UserId, GradingRecord)]) -> String {
    let mut text = String::from("🏅 Top results:\n\n");
    for (i, (user, r)) in entries.iter().enumerate() {
        let _ = write!(
            text,
            "{}. 👤 {} — {}% {} ({})\n📅 {}\n",
            i + 1,
            user,
            r.score,
            GradeBand::from_percent(r.score).label(),
            r.code,
            r.date.format(minute_format::FORMAT)
        );
    }
    text
}
