// src/quiz/ledger.rs

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::StoreError,
    models::grading_record::{GradingRecord, UserId},
    store::{KeyedStore, SnapshotBackend},
};

/// Append-only per-user history of graded submissions.
pub struct ResultsLedger {
    store: KeyedStore<UserId, Vec<GradingRecord>>,
}

impl ResultsLedger {
    pub fn new(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self {
            store: KeyedStore::new(backend, "results"),
        }
    }

    /// Appends `record` to `user`'s history and returns it with its ledger
    /// sequence number filled in.
    pub async fn append(
        &self,
        user: UserId,
        mut record: GradingRecord,
    ) -> Result<GradingRecord, StoreError> {
        self.store
            .update(|ledger| {
                record.seq = next_seq(ledger);
                ledger.entry(user).or_default().push(record.clone());
                record
            })
            .await
    }

    /// Last `n` records of `user`, oldest first.
    pub async fn recent_for(&self, user: UserId, n: usize) -> Result<Vec<GradingRecord>, StoreError> {
        let mut ledger = self.store.load().await?;
        Ok(ledger
            .remove(&user)
            .map(|records| recent(records, n))
            .unwrap_or_default())
    }

    /// Best `n` individual attempts across all users.
    pub async fn leaderboard(&self, n: usize) -> Result<Vec<(UserId, GradingRecord)>, StoreError> {
        Ok(rank(self.store.load().await?, n))
    }
}

fn next_seq(ledger: &BTreeMap<UserId, Vec<GradingRecord>>) -> u64 {
    ledger
        .values()
        .flatten()
        .map(|r| r.seq)
        .max()
        .map_or(1, |max| max + 1)
}

fn recent(mut records: Vec<GradingRecord>, n: usize) -> Vec<GradingRecord> {
    let skip = records.len().saturating_sub(n);
    records.drain(..skip);
    records
}

/// Flattens every attempt, orders by score (highest first) and keeps `n`.
/// Equal scores keep append order; the sort is stable so records written
/// before sequence numbers existed fall back to their stored order.
///
/// Stored order for those legacy records is by user id, then by position in
/// the user's history. The snapshot is loaded into a `BTreeMap`, so the order
/// in which users first appeared in an old file is not preserved.
fn rank(ledger: BTreeMap<UserId, Vec<GradingRecord>>, n: usize) -> Vec<(UserId, GradingRecord)> {
    let mut attempts: Vec<(UserId, GradingRecord)> = ledger
        .into_iter()
        .flat_map(|(user, records)| records.into_iter().map(move |r| (user, r)))
        .collect();
    attempts.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score).then(a.seq.cmp(&b.seq)));
    attempts.truncate(n);
    attempts
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{models::answer_key::TestCode, store::MemoryBackend};

    fn record(code: &str, score: u32) -> GradingRecord {
        GradingRecord {
            code: TestCode::parse(code).unwrap(),
            score,
            correct: score as usize,
            total: 100,
            date: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            seq: 0,
        }
    }

    fn ledger() -> ResultsLedger {
        ResultsLedger::new(Arc::new(MemoryBackend::default()))
    }

    #[tokio::test]
    async fn recent_returns_last_five_oldest_first() {
        let ledger = ledger();
        for i in 0..7 {
            ledger.append(10, record(&format!("T{}", i), 50)).await.unwrap();
        }

        let recent = ledger.recent_for(10, 5).await.unwrap();
        let codes: Vec<&str> = recent.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["T2", "T3", "T4", "T5", "T6"]);
    }

    #[tokio::test]
    async fn recent_is_empty_for_unknown_user() {
        let ledger = ledger();
        ledger.append(10, record("T", 50)).await.unwrap();
        assert!(ledger.recent_for(11, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_assigns_increasing_sequence_numbers() {
        let ledger = ledger();
        let first = ledger.append(1, record("A", 10)).await.unwrap();
        let second = ledger.append(2, record("B", 10)).await.unwrap();
        assert!(second.seq > first.seq);
    }

    #[tokio::test]
    async fn leaderboard_sorts_by_score_then_append_order() {
        let ledger = ledger();
        // User 9 sorts after user 1 in the map, but appended first.
        ledger.append(9, record("EARLY", 80)).await.unwrap();
        ledger.append(1, record("LATE", 80)).await.unwrap();
        ledger.append(1, record("TOP", 100)).await.unwrap();
        ledger.append(9, record("LOW", 20)).await.unwrap();

        let board = ledger.leaderboard(5).await.unwrap();
        let rows: Vec<(UserId, &str)> = board.iter().map(|(u, r)| (*u, r.code.as_str())).collect();
        assert_eq!(rows, vec![(1, "TOP"), (9, "EARLY"), (1, "LATE"), (9, "LOW")]);
    }

    #[tokio::test]
    async fn leaderboard_counts_attempts_not_users() {
        let ledger = ledger();
        for score in [90, 95, 85, 99, 70, 100] {
            ledger.append(5, record("T", score)).await.unwrap();
        }
        ledger.append(6, record("T", 10)).await.unwrap();

        let board = ledger.leaderboard(5).await.unwrap();
        assert_eq!(board.len(), 5);
        assert!(board.iter().all(|(user, _)| *user == 5));
        let scores: Vec<u32> = board.iter().map(|(_, r)| r.score).collect();
        assert_eq!(scores, vec![100, 99, 95, 90, 85]);
    }

    #[test]
    fn legacy_records_keep_stored_order_on_ties() {
        let mut map = BTreeMap::new();
        map.insert(1, vec![record("X", 60), record("Y", 60)]);
        map.insert(2, vec![record("Z", 60)]);

        let codes: Vec<String> = rank(map, 5)
            .into_iter()
            .map(|(_, r)| r.code.to_string())
            .collect();
        assert_eq!(codes, vec!["X", "Y", "Z"]);
    }

    #[tokio::test]
    async fn legacy_ties_across_users_follow_user_id() {
        let backend = Arc::new(MemoryBackend::default());
        // User 9 comes first in the file but has the larger id.
        backend
            .write(
                "results",
                r#"{
                    "9": [{"code": "NINE", "score": 60, "correct": 3, "total": 5, "date": "2024-01-01 09:00"}],
                    "2": [{"code": "TWO", "score": 60, "correct": 3, "total": 5, "date": "2024-01-01 10:00"}]
                }"#,
            )
            .await
            .unwrap();
        let ledger = ResultsLedger::new(backend);

        let board = ledger.leaderboard(5).await.unwrap();
        let rows: Vec<(UserId, &str)> = board.iter().map(|(u, r)| (*u, r.code.as_str())).collect();
        assert_eq!(rows, vec![(2, "TWO"), (9, "NINE")]);
    }
}
