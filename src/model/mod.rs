mod difficulty;
mod game_engine_command;
mod game_engine_event;
mod round;
mod score;
mod tile;

pub use difficulty::Difficulty;
pub use game_engine_command::{GameEngineCommand, SettingsChange};
pub use game_engine_event::GameEngineEvent;
pub use round::{FlipOutcome, LossReason, Round, RoundPhase, TickOutcome};
pub use score::{
    leaderboard_ordering, GlobalStats, HighScoreTable, LeaderboardEntry, LeaderboardExport,
    ScoreRecord,
};
pub use tile::{Face, Tile, TileState, FACE_NAMES};
