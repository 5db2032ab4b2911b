// src/quiz/grading.rs

use std::fmt;

use serde::Serialize;

use crate::{error::QuizError, models::answer_key::AnswerKey};

/// Result of comparing one submission against its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

impl Score {
    pub fn band(&self) -> GradeBand {
        GradeBand::from_percent(self.percent)
    }
}

/// Qualitative grade derived from the percent score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GradeBand {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl GradeBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            100.. => GradeBand::APlus,
            90..=99 => GradeBand::A,
            80..=89 => GradeBand::B,
            70..=79 => GradeBand::C,
            60..=69 => GradeBand::D,
            _ => GradeBand::F,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            GradeBand::APlus => "A+",
            GradeBand::A => "A",
            GradeBand::B => "B",
            GradeBand::C => "C",
            GradeBand::D => "D",
            GradeBand::F => "F",
        }
    }

    /// Label shown to users, e.g. `🏆 A+ (Excellent!)`.
    pub fn label(&self) -> &'static str {
        match self {
            GradeBand::APlus => "🏆 A+ (Excellent!)",
            GradeBand::A => "🎉 A (Great)",
            GradeBand::B => "✅ B (Good)",
            GradeBand::C => "🟡 C (Satisfactory)",
            GradeBand::D => "🟠 D (Fair)",
            GradeBand::F => "❌ F (Poor)",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// `correct / total * 100`, rounded half up.
pub fn percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as u32
}

/// Grades `submitted` item by item against `key`.
///
/// The submission must have exactly as many answers as the key; there is no
/// partial credit for a short or long submission.
pub fn grade<S: AsRef<str>>(key: &AnswerKey, submitted: &[S]) -> Result<Score, QuizError> {
    if submitted.len() != key.len() {
        return Err(QuizError::LengthMismatch {
            expected: key.len(),
            received: submitted.len(),
        });
    }

    let correct = key
        .tokens()
        .iter()
        .zip(submitted)
        .filter(|(expected, answer)| expected.accepts(answer.as_ref()))
        .count();
    let total = key.len();

    Ok(Score {
        correct,
        total,
        percent: percent(correct, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> AnswerKey {
        AnswerKey::new(&["A", "B", "42", "Paris"])
    }

    fn submit(line: &str) -> Result<Score, QuizError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        grade(&key(), tokens.as_slice())
    }

    #[test]
    fn full_marks_with_case_differences() {
        let score = submit("A B 42 paris").unwrap();
        assert_eq!((score.correct, score.total, score.percent), (4, 4, 100));
        assert_eq!(score.band(), GradeBand::APlus);
    }

    #[test]
    fn one_wrong_choice_gives_band_c() {
        let score = submit("A C 42 Paris").unwrap();
        assert_eq!((score.correct, score.total, score.percent), (3, 4, 75));
        assert_eq!(score.band().letter(), "C");
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(matches!(
            submit("A B 42"),
            Err(QuizError::LengthMismatch { expected: 4, received: 3 })
        ));
        assert!(matches!(
            submit("A B 42 Paris X"),
            Err(QuizError::LengthMismatch { expected: 4, received: 5 })
        ));
    }

    #[test]
    fn choice_keys_graded_case_insensitively_against_themselves() {
        let raw = ["a", "B", "c", "D", "a"];
        let key = AnswerKey::new(&raw);
        assert_eq!(grade(&key, &raw).unwrap().percent, 100);
        assert_eq!(grade(&key, &["A", "b", "C", "d", "A"]).unwrap().percent, 100);
        assert_eq!(grade(&key, &["B", "B", "C", "D", "A"]).unwrap().correct, 4);
    }

    #[test]
    fn open_items_ignore_whitespace_and_case() {
        let key = AnswerKey::new(&["New York", "3.14"]);
        let score = grade(&key, &["  new york ", "3.14\t"]).unwrap();
        assert_eq!(score.correct, 2);

        // Each differing item costs exactly one.
        assert_eq!(grade(&key, &["Boston", "3.14"]).unwrap().correct, 1);
        assert_eq!(grade(&key, &["Boston", "2.71"]).unwrap().correct, 0);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(179, 200), 90); // 89.5
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(0, 5), 0);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(GradeBand::from_percent(100), GradeBand::APlus);
        assert_eq!(GradeBand::from_percent(99), GradeBand::A);
        assert_eq!(GradeBand::from_percent(90), GradeBand::A);
        assert_eq!(GradeBand::from_percent(89), GradeBand::B);
        assert_eq!(GradeBand::from_percent(80), GradeBand::B);
        assert_eq!(GradeBand::from_percent(70), GradeBand::C);
        assert_eq!(GradeBand::from_percent(60), GradeBand::D);
        assert_eq!(GradeBand::from_percent(59), GradeBand::F);
        assert_eq!(GradeBand::from_percent(0), GradeBand::F);
    }
}
