use super::{Difficulty, LeaderboardEntry, LossReason, ScoreRecord, Tile};
use crate::game::settings::Settings;

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    /// Full tile snapshot after any board change.
    BoardUpdated(Vec<Tile>),
    MovesChanged(u32),
    /// Move-limit mode only.
    RemainingMovesChanged(u32),
    StarRatingChanged(u8),
    TimerUpdated {
        remaining_seconds: u32,
        total_seconds: u32,
    },
    /// Two open tiles did not match; the board stays locked until the
    /// presenter sends `ResolveMismatch` back.
    MismatchedPair(usize, usize),
    HintRevealed(usize, usize),
    RoundWon(ScoreRecord),
    RoundLost(LossReason),
    BestScoreChanged(Difficulty, Option<ScoreRecord>),
    LeaderboardUpdated(Difficulty, Vec<LeaderboardEntry>),
    SettingsChanged(Settings),
}
