use std::time::{Duration, SystemTime};

use itertools::Itertools;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::game::store::ScoreStore;
use crate::model::{
    leaderboard_ordering, Difficulty, GlobalStats, HighScoreTable, LeaderboardEntry,
    LeaderboardExport, ScoreRecord,
};

const LEADERBOARD_LIMIT: usize = 5;

/// Best scores, per-difficulty leaderboards, the combined high-score table
/// and aggregate play stats, all behind the abstract store. Store failures
/// never reach game logic: unreadable records read as absent, failed writes
/// are logged and dropped.
pub struct StatsManager {
    store: Box<dyn ScoreStore>,
}

impl StatsManager {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self { store }
    }

    fn best_key(difficulty: Difficulty) -> String {
        format!("best_{}", difficulty.key())
    }

    fn leaderboard_key(difficulty: Difficulty) -> String {
        format!("leaderboard_{}", difficulty.key())
    }

    fn global_stats_key(difficulty: Difficulty) -> String {
        format!("global_stats_{}", difficulty.key())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store
            .get(key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(contents) => {
                if let Err(err) = self.store.put(key, &contents) {
                    warn!(target: "stats", "Failed to persist {}: {}", key, err);
                }
            }
            Err(err) => warn!(target: "stats", "Failed to serialize {}: {}", key, err),
        }
    }

    pub fn best(&self, difficulty: Difficulty) -> Option<ScoreRecord> {
        self.read(&Self::best_key(difficulty))
    }

    pub fn leaderboard(&self, difficulty: Difficulty) -> Vec<LeaderboardEntry> {
        self.read(&Self::leaderboard_key(difficulty))
            .unwrap_or_default()
    }

    pub fn high_scores(&self) -> HighScoreTable {
        self.read("high_scores").unwrap_or_default()
    }

    pub fn global_stats(&self, difficulty: Difficulty) -> GlobalStats {
        self.read(&Self::global_stats_key(difficulty))
            .unwrap_or_default()
    }

    /// Record a won round. Returns whether the per-difficulty best was
    /// replaced.
    pub fn record_win(
        &mut self,
        difficulty: Difficulty,
        record: &ScoreRecord,
        hints_used: u32,
    ) -> bool {
        let improved = record.beats(self.best(difficulty).as_ref());
        if improved {
            self.write(&Self::best_key(difficulty), record);
        }

        let entries = self
            .leaderboard(difficulty)
            .into_iter()
            .chain(std::iter::once(LeaderboardEntry::new(
                record.clone(),
                SystemTime::now(),
            )))
            .sorted_by(|a, b| leaderboard_ordering(&a.score, &b.score))
            .take(LEADERBOARD_LIMIT)
            .collect::<Vec<_>>();
        self.write(&Self::leaderboard_key(difficulty), &entries);

        let mut table = self.high_scores();
        if record.beats(table.get(&difficulty)) {
            table.insert(difficulty, record.clone());
            self.write("high_scores", &table);
        }

        let mut stats = self.global_stats(difficulty);
        stats.games_played += 1;
        stats.games_won += 1;
        stats.total_time_played += Duration::from_secs(record.elapsed_seconds as u64);
        stats.total_hints_used += hints_used;
        self.write(&Self::global_stats_key(difficulty), &stats);

        improved
    }

    pub fn record_loss(&mut self, difficulty: Difficulty, elapsed_seconds: u32, hints_used: u32) {
        let mut stats = self.global_stats(difficulty);
        stats.games_played += 1;
        stats.games_lost += 1;
        stats.total_time_played += Duration::from_secs(elapsed_seconds as u64);
        stats.total_hints_used += hints_used;
        self.write(&Self::global_stats_key(difficulty), &stats);
    }

    pub fn clear_leaderboard(&mut self, difficulty: Difficulty) {
        if let Err(err) = self.store.remove(&Self::leaderboard_key(difficulty)) {
            warn!(target: "stats", "Failed to clear leaderboard: {}", err);
        }
    }

    pub fn export_leaderboard(&self, difficulty: Difficulty) -> LeaderboardExport {
        LeaderboardExport {
            difficulty,
            data: self.leaderboard(difficulty),
        }
    }

    pub fn export_leaderboard_json(&self, difficulty: Difficulty) -> Option<String> {
        serde_json::to_string_pretty(&self.export_leaderboard(difficulty)).ok()
    }

    /// One-line summary of the current best, for sharing.
    pub fn share_summary(&self, difficulty: Difficulty) -> Option<String> {
        self.best(difficulty).map(|best| {
            format!(
                "Pairvault — {} best: {}, {} moves, {}★",
                difficulty.key().to_uppercase(),
                best.time,
                best.moves,
                best.stars
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::store::MemoryStore;

    fn manager() -> StatsManager {
        StatsManager::new(Box::new(MemoryStore::new()))
    }

    fn record(moves: u32, stars: u8, elapsed: u32) -> ScoreRecord {
        ScoreRecord::new(elapsed, moves, stars)
    }

    #[test]
    fn test_first_win_becomes_best() {
        let mut stats = manager();
        assert_eq!(stats.best(Difficulty::Easy), None);

        assert!(stats.record_win(Difficulty::Easy, &record(8, 3, 30), 0));
        assert_eq!(stats.best(Difficulty::Easy), Some(record(8, 3, 30)));
    }

    #[test]
    fn test_weaker_win_keeps_stored_best() {
        let mut stats = manager();
        stats.record_win(Difficulty::Easy, &record(8, 3, 30), 0);

        assert!(!stats.record_win(Difficulty::Easy, &record(20, 1, 10), 0));
        assert_eq!(stats.best(Difficulty::Easy), Some(record(8, 3, 30)));
        // but it still lands on the leaderboard
        assert_eq!(stats.leaderboard(Difficulty::Easy).len(), 2);
    }

    #[test]
    fn test_best_is_per_difficulty() {
        let mut stats = manager();
        stats.record_win(Difficulty::Easy, &record(8, 3, 30), 0);
        assert_eq!(stats.best(Difficulty::Hard), None);
    }

    #[test]
    fn test_leaderboard_sorted_and_truncated() {
        let mut stats = manager();
        for moves in [14u32, 10, 16, 12, 11, 13] {
            stats.record_win(Difficulty::Medium, &record(moves, 2, moves), 0);
        }

        let entries = stats.leaderboard(Difficulty::Medium);
        assert_eq!(entries.len(), 5);
        let move_counts: Vec<u32> = entries.iter().map(|e| e.score.moves).collect();
        assert_eq!(move_counts, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_leaderboard_breaks_move_ties_by_time() {
        let mut stats = manager();
        stats.record_win(Difficulty::Medium, &record(10, 3, 40), 0);
        stats.record_win(Difficulty::Medium, &record(10, 3, 25), 0);

        let entries = stats.leaderboard(Difficulty::Medium);
        assert_eq!(entries[0].score.elapsed_seconds, 25);
        assert_eq!(entries[1].score.elapsed_seconds, 40);
    }

    #[test]
    fn test_corrupt_records_read_as_absent() {
        let mut store = MemoryStore::new();
        store.put("best_easy", "{broken").unwrap();
        store.put("leaderboard_easy", "not even json").unwrap();
        store.put("global_stats_easy", "[]").unwrap();
        let stats = StatsManager::new(Box::new(store));

        assert_eq!(stats.best(Difficulty::Easy), None);
        assert!(stats.leaderboard(Difficulty::Easy).is_empty());
        assert_eq!(stats.global_stats(Difficulty::Easy).games_played, 0);
    }

    #[test]
    fn test_clear_leaderboard() {
        let mut stats = manager();
        stats.record_win(Difficulty::Easy, &record(8, 3, 30), 0);
        stats.clear_leaderboard(Difficulty::Easy);
        assert!(stats.leaderboard(Difficulty::Easy).is_empty());
        // the best record is untouched
        assert!(stats.best(Difficulty::Easy).is_some());
    }

    #[test]
    fn test_high_score_table_tracks_all_difficulties() {
        let mut stats = manager();
        stats.record_win(Difficulty::Easy, &record(8, 3, 30), 0);
        stats.record_win(Difficulty::Hard, &record(18, 1, 44), 0);
        stats.record_win(Difficulty::Hard, &record(9, 3, 40), 0);

        let table = stats.high_scores();
        assert_eq!(table.get(&Difficulty::Easy), Some(&record(8, 3, 30)));
        assert_eq!(table.get(&Difficulty::Hard), Some(&record(9, 3, 40)));
        assert_eq!(table.get(&Difficulty::Medium), None);
    }

    #[test]
    fn test_global_stats_accumulate_wins_and_losses() {
        let mut stats = manager();
        stats.record_win(Difficulty::Easy, &record(8, 3, 30), 2);
        stats.record_loss(Difficulty::Easy, 60, 1);

        let global = stats.global_stats(Difficulty::Easy);
        assert_eq!(global.games_played, 2);
        assert_eq!(global.games_won, 1);
        assert_eq!(global.games_lost, 1);
        assert_eq!(global.total_time_played, Duration::from_secs(90));
        assert_eq!(global.total_hints_used, 3);
    }

    #[test]
    fn test_export_document_shape() {
        let mut stats = manager();
        stats.record_win(Difficulty::Hard, &record(12, 2, 40), 0);

        let json = stats.export_leaderboard_json(Difficulty::Hard).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["difficulty"], "Hard");
        assert_eq!(value["data"].as_array().unwrap().len(), 1);
        assert_eq!(value["data"][0]["moves"], 12);
    }

    #[test]
    fn test_share_summary() {
        let mut stats = manager();
        assert_eq!(stats.share_summary(Difficulty::Easy), None);

        stats.record_win(Difficulty::Easy, &record(8, 3, 75), 0);
        assert_eq!(
            stats.share_summary(Difficulty::Easy).unwrap(),
            "Pairvault — EASY best: 01:15, 8 moves, 3★"
        );
    }
}
