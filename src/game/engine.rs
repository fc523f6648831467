use log::{info, trace};
use std::cell::RefCell;
use std::rc::Rc;

use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::game::settings::Settings;
use crate::game::stats_manager::StatsManager;
use crate::model::{
    Difficulty, FlipOutcome, GameEngineCommand, GameEngineEvent, LossReason, Round, SettingsChange,
    TickOutcome,
};

/// Owns the current round and all orchestration around it: commands come in
/// over the observer channel, state-change notifications go out over the
/// emitter. Rendering, audio and the mismatch reveal delay all live with the
/// subscribers.
pub struct GameEngine {
    round: Option<Round>,
    settings: Settings,
    stats: StatsManager,
    event_emitter: EventEmitter<GameEngineEvent>,
    command_subscription: Option<Unsubscriber<GameEngineCommand>>,
    last_star_rating: u8,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.command_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl GameEngine {
    pub fn new(
        command_observer: EventObserver<GameEngineCommand>,
        event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        stats: StatsManager,
    ) -> Rc<RefCell<Self>> {
        let engine = Self {
            round: None,
            settings,
            stats,
            event_emitter,
            command_subscription: None,
            last_star_rating: 3,
        };
        let refcell = Rc::new(RefCell::new(engine));
        GameEngine::wire_subscription(refcell.clone(), command_observer);
        refcell
    }

    fn wire_subscription(
        engine: Rc<RefCell<Self>>,
        command_observer: EventObserver<GameEngineCommand>,
    ) {
        let handler = engine.clone();
        let subscription = command_observer.subscribe(move |command| {
            let mut engine = handler.borrow_mut();
            engine.handle_command(command.clone());
        });
        engine.borrow_mut().command_subscription = Some(subscription);
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &StatsManager {
        &self.stats
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::NewRound(difficulty, seed) => self.start_round(difficulty, seed),
            GameEngineCommand::Restart => self.start_round(None, None),
            GameEngineCommand::SelectTile(index) => self.select_tile(index),
            GameEngineCommand::ResolveMismatch => self.resolve_mismatch(),
            GameEngineCommand::ShowHint => self.show_hint(),
            GameEngineCommand::Tick => self.tick(),
            GameEngineCommand::ClearLeaderboard => self.clear_leaderboard(),
            GameEngineCommand::ChangeSettings(change) => self.change_settings(change),
            GameEngineCommand::Quit => (),
        }
    }

    /// Replace the current round wholesale. The previous round is dropped
    /// here, so a tick scheduled against it can never land: the new round
    /// ignores ticks until its own first flip.
    fn start_round(&mut self, difficulty: Option<Difficulty>, seed: Option<u64>) {
        let difficulty = difficulty.unwrap_or(self.settings.difficulty);
        if difficulty != self.settings.difficulty {
            self.settings.difficulty = difficulty;
            self.save_settings();
            self.event_emitter
                .emit(&GameEngineEvent::SettingsChanged(self.settings.clone()));
        }

        let round = Round::new(difficulty, self.settings.move_limit_enabled, seed);
        info!(
            target: "engine",
            "New round; difficulty: {}; seed: {}; playthrough: {}",
            difficulty,
            round.seed(),
            round.playthrough_id()
        );
        self.last_star_rating = round.star_rating();
        let remaining_moves = round.remaining_moves();
        let total_seconds = difficulty.time_budget_seconds();
        self.round = Some(round);

        self.emit_board();
        self.event_emitter.emit(&GameEngineEvent::TimerUpdated {
            remaining_seconds: total_seconds,
            total_seconds,
        });
        self.event_emitter.emit(&GameEngineEvent::MovesChanged(0));
        self.event_emitter
            .emit(&GameEngineEvent::StarRatingChanged(self.last_star_rating));
        if let Some(remaining) = remaining_moves {
            self.event_emitter
                .emit(&GameEngineEvent::RemainingMovesChanged(remaining));
        }
        self.event_emitter.emit(&GameEngineEvent::BestScoreChanged(
            difficulty,
            self.stats.best(difficulty),
        ));
        self.event_emitter.emit(&GameEngineEvent::LeaderboardUpdated(
            difficulty,
            self.stats.leaderboard(difficulty),
        ));
    }

    fn select_tile(&mut self, index: usize) {
        let outcome = match self.round.as_mut() {
            Some(round) => round.select_tile(index),
            None => return,
        };
        if outcome == FlipOutcome::Rejected {
            trace!(target: "engine", "Selection of tile {} rejected", index);
            return;
        }

        self.emit_board();
        match outcome {
            FlipOutcome::AwaitingSecondFlip => {}
            FlipOutcome::Matched { .. } => self.emit_resolved_attempt(),
            FlipOutcome::Mismatched { tiles: (a, b) } => {
                self.emit_resolved_attempt();
                self.event_emitter
                    .emit(&GameEngineEvent::MismatchedPair(a, b));
            }
            FlipOutcome::Won(record) => {
                self.emit_resolved_attempt();
                self.event_emitter
                    .emit(&GameEngineEvent::RoundWon(record.clone()));

                let (difficulty, hints_used) = match self.round.as_ref() {
                    Some(round) => (round.difficulty, round.hints_used()),
                    None => return,
                };
                let improved = self.stats.record_win(difficulty, &record, hints_used);
                if improved {
                    self.event_emitter.emit(&GameEngineEvent::BestScoreChanged(
                        difficulty,
                        Some(record),
                    ));
                }
                self.event_emitter.emit(&GameEngineEvent::LeaderboardUpdated(
                    difficulty,
                    self.stats.leaderboard(difficulty),
                ));
            }
            FlipOutcome::LostByMoves => {
                self.emit_resolved_attempt();
                self.event_emitter
                    .emit(&GameEngineEvent::RoundLost(LossReason::MovesExhausted));
                self.record_loss();
            }
            FlipOutcome::Rejected => {}
        }
    }

    fn resolve_mismatch(&mut self) {
        if let Some(round) = self.round.as_mut() {
            round.resolve_mismatch();
            self.emit_board();
        }
    }

    fn tick(&mut self) {
        let outcome = match self.round.as_mut() {
            Some(round) => round.tick(),
            None => return,
        };
        let total_seconds = match self.round.as_ref() {
            Some(round) => round.difficulty.time_budget_seconds(),
            None => return,
        };
        match outcome {
            TickOutcome::Ignored => {}
            TickOutcome::TimeUpdated(remaining_seconds) => {
                self.event_emitter.emit(&GameEngineEvent::TimerUpdated {
                    remaining_seconds,
                    total_seconds,
                });
            }
            TickOutcome::LostByTime => {
                self.event_emitter.emit(&GameEngineEvent::TimerUpdated {
                    remaining_seconds: 0,
                    total_seconds,
                });
                self.event_emitter
                    .emit(&GameEngineEvent::RoundLost(LossReason::TimeExpired));
                self.record_loss();
            }
        }
    }

    fn show_hint(&mut self) {
        let hint = match self.round.as_mut() {
            Some(round) => round.hint(),
            None => None,
        };
        if let Some((a, b)) = hint {
            self.event_emitter
                .emit(&GameEngineEvent::HintRevealed(a, b));
        }
    }

    fn clear_leaderboard(&mut self) {
        let difficulty = self.settings.difficulty;
        self.stats.clear_leaderboard(difficulty);
        self.event_emitter.emit(&GameEngineEvent::LeaderboardUpdated(
            difficulty,
            self.stats.leaderboard(difficulty),
        ));
    }

    /// Difficulty changes restart immediately; a move-limit toggle only
    /// applies from the next round.
    fn change_settings(&mut self, change: SettingsChange) {
        let previous_difficulty = self.settings.difficulty;
        if let Some(difficulty) = change.difficulty {
            self.settings.difficulty = difficulty;
        }
        if let Some(enabled) = change.move_limit_enabled {
            self.settings.move_limit_enabled = enabled;
        }
        if let Some(muted) = change.muted {
            self.settings.muted = muted;
        }
        self.save_settings();
        self.event_emitter
            .emit(&GameEngineEvent::SettingsChanged(self.settings.clone()));
        if self.settings.difficulty != previous_difficulty {
            self.start_round(None, None);
        }
    }

    fn save_settings(&self) {
        if let Err(err) = self.settings.save() {
            log::warn!(target: "engine", "Failed to save settings: {}", err);
        }
    }

    fn emit_board(&self) {
        if let Some(round) = self.round.as_ref() {
            self.event_emitter
                .emit(&GameEngineEvent::BoardUpdated(round.tiles().to_vec()));
        }
    }

    fn emit_resolved_attempt(&mut self) {
        let (moves, remaining_moves, stars) = match self.round.as_ref() {
            Some(round) => (round.moves(), round.remaining_moves(), round.star_rating()),
            None => return,
        };
        self.event_emitter
            .emit(&GameEngineEvent::MovesChanged(moves));
        if let Some(remaining) = remaining_moves {
            self.event_emitter
                .emit(&GameEngineEvent::RemainingMovesChanged(remaining));
        }
        if stars != self.last_star_rating {
            self.last_star_rating = stars;
            self.event_emitter
                .emit(&GameEngineEvent::StarRatingChanged(stars));
        }
    }

    fn record_loss(&mut self) {
        let (difficulty, elapsed, hints_used) = match self.round.as_ref() {
            Some(round) => (round.difficulty, round.elapsed_seconds(), round.hints_used()),
            None => return,
        };
        self.stats.record_loss(difficulty, elapsed, hints_used);
    }
}
