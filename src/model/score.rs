use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampSeconds;

use crate::helpers::format_time;
use crate::model::Difficulty;

/// Result of a won round. `time` is the `MM:SS` rendering of
/// `elapsed_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub time: String,
    pub moves: u32,
    pub stars: u8,
    pub elapsed_seconds: u32,
}

impl ScoreRecord {
    pub fn new(elapsed_seconds: u32, moves: u32, stars: u8) -> Self {
        Self {
            time: format_time(elapsed_seconds),
            moves,
            stars,
            elapsed_seconds,
        }
    }

    /// Best-score replacement rule: more stars beats fewer; then fewer
    /// moves; then lower elapsed time. Strict on every step, so an exact
    /// tie keeps the stored record.
    pub fn beats(&self, prev: Option<&ScoreRecord>) -> bool {
        let prev = match prev {
            Some(prev) => prev,
            None => return true,
        };
        match self.stars.cmp(&prev.stars) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.moves.cmp(&prev.moves) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.elapsed_seconds < prev.elapsed_seconds,
            },
        }
    }
}

/// Leaderboard rank: fewest moves first, then lowest elapsed time.
pub fn leaderboard_ordering(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    a.moves
        .cmp(&b.moves)
        .then(a.elapsed_seconds.cmp(&b.elapsed_seconds))
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub score: ScoreRecord,
    #[serde_as(as = "Option<TimestampSeconds>")]
    #[serde(default)]
    pub recorded_at: Option<SystemTime>,
}

impl LeaderboardEntry {
    pub fn new(score: ScoreRecord, recorded_at: SystemTime) -> Self {
        Self {
            score,
            recorded_at: Some(recorded_at),
        }
    }
}

/// Export document for a single difficulty's leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardExport {
    pub difficulty: Difficulty,
    pub data: Vec<LeaderboardEntry>,
}

/// Best record per difficulty, kept as one combined document.
pub type HighScoreTable = HashMap<Difficulty, ScoreRecord>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_time_played: Duration,
    pub total_hints_used: u32,
}
