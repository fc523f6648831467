use super::Difficulty;

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsChange {
    pub difficulty: Option<Difficulty>,
    pub move_limit_enabled: Option<bool>,
    pub muted: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum GameEngineCommand {
    /// Build a fresh round. `None` difficulty falls back to the persisted
    /// selection; the seed override exists for replays and tests.
    NewRound(Option<Difficulty>, Option<u64>),
    /// New round at the current difficulty.
    Restart,
    SelectTile(usize),
    /// Issued by the presenter once its mismatch reveal delay has elapsed.
    ResolveMismatch,
    ShowHint,
    /// One second of wall-clock time, delivered by the external scheduler.
    Tick,
    ClearLeaderboard,
    ChangeSettings(SettingsChange),
    Quit,
}
