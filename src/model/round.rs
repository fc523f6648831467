use itertools::Itertools;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use uuid::Uuid;

use crate::model::{Difficulty, Face, ScoreRecord, Tile, TileState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    TimeExpired,
    MovesExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    NotStarted,
    Running,
    Won,
    Lost(LossReason),
}

/// Result of a single `select_tile` call. `Won` and `LostByMoves` supersede
/// the plain match/mismatch outcomes for the attempt that ends the round.
#[derive(Debug, Clone, PartialEq)]
pub enum FlipOutcome {
    Rejected,
    AwaitingSecondFlip,
    Matched { tiles: (usize, usize) },
    Mismatched { tiles: (usize, usize) },
    Won(ScoreRecord),
    LostByMoves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    TimeUpdated(u32),
    LostByTime,
}

/// One playthrough from deck build to win or loss. Owns its tiles; the
/// engine replaces the whole value on every new game.
#[derive(Debug, Clone)]
pub struct Round {
    pub difficulty: Difficulty,
    playthrough_id: Uuid,
    tiles: Vec<Tile>,
    open: Vec<usize>,
    moves: u32,
    matched_count: usize,
    remaining_seconds: u32,
    remaining_moves: Option<u32>,
    hints_used: u32,
    phase: RoundPhase,
    locked: bool,
    seed: u64,
}

impl Round {
    pub fn new(difficulty: Difficulty, move_limit_enabled: bool, seed: Option<u64>) -> Self {
        let tile_count = difficulty.tile_count();
        let pair_count = difficulty.pair_count();
        assert!(tile_count % 2 == 0, "tile count must be even");

        let mut pool = Face::pool();
        assert!(
            pair_count <= pool.len(),
            "pair count {} exceeds face pool of {}",
            pair_count,
            pool.len()
        );

        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let mut rng = StdRng::seed_from_u64(seed);

        pool.shuffle(&mut rng);
        let mut faces: Vec<Face> = pool.into_iter().take(pair_count).collect();
        faces.extend(faces.clone());
        faces.shuffle(&mut rng);

        let tiles = faces
            .into_iter()
            .enumerate()
            .map(|(index, face)| Tile::new(index, face))
            .collect::<Vec<_>>();
        trace!(target: "round", "Built deck (seed {}): {:?}", seed, tiles);

        Self {
            difficulty,
            playthrough_id: Uuid::new_v4(),
            tiles,
            open: Vec::with_capacity(2),
            moves: 0,
            matched_count: 0,
            remaining_seconds: difficulty.time_budget_seconds(),
            remaining_moves: move_limit_enabled.then(|| difficulty.move_budget()),
            hints_used: 0,
            phase: RoundPhase::NotStarted,
            locked: false,
            seed,
        }
    }

    pub fn playthrough_id(&self) -> Uuid {
        self.playthrough_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.difficulty.time_budget_seconds() - self.remaining_seconds
    }

    pub fn remaining_moves(&self) -> Option<u32> {
        self.remaining_moves
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, RoundPhase::Won | RoundPhase::Lost(_))
    }

    /// 3 stars up to the first threshold, 2 up to the second, 1 beyond.
    pub fn star_rating(&self) -> u8 {
        let (three_max, two_max) = self.difficulty.star_thresholds();
        if self.moves <= three_max {
            3
        } else if self.moves <= two_max {
            2
        } else {
            1
        }
    }

    pub fn score_record(&self) -> ScoreRecord {
        ScoreRecord::new(self.elapsed_seconds(), self.moves, self.star_rating())
    }

    /// Flip the tile at `index`. Invalid selections (locked board, finished
    /// round, out-of-range index, tile already up or matched) are rejected
    /// without touching any state.
    pub fn select_tile(&mut self, index: usize) -> FlipOutcome {
        if self.is_over() || self.locked {
            return FlipOutcome::Rejected;
        }
        match self.tiles.get(index) {
            Some(tile) if tile.is_face_down() => (),
            _ => return FlipOutcome::Rejected,
        }

        // the countdown starts with the first accepted flip
        if self.phase == RoundPhase::NotStarted {
            self.phase = RoundPhase::Running;
        }

        self.tiles[index].state = TileState::FaceUp;
        self.open.push(index);
        if self.open.len() < 2 {
            return FlipOutcome::AwaitingSecondFlip;
        }

        self.moves += 1;
        self.locked = true;
        let (first, second) = (self.open[0], self.open[1]);
        let mut outcome = if self.tiles[first].face == self.tiles[second].face {
            self.tiles[first].state = TileState::Matched;
            self.tiles[second].state = TileState::Matched;
            self.matched_count += 2;
            self.open.clear();
            self.locked = false;
            if self.matched_count == self.tiles.len() {
                self.phase = RoundPhase::Won;
                FlipOutcome::Won(self.score_record())
            } else {
                FlipOutcome::Matched {
                    tiles: (first, second),
                }
            }
        } else {
            // stays locked until resolve_mismatch
            FlipOutcome::Mismatched {
                tiles: (first, second),
            }
        };

        if let Some(remaining) = self.remaining_moves.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && self.phase != RoundPhase::Won {
                self.phase = RoundPhase::Lost(LossReason::MovesExhausted);
                self.locked = true;
                outcome = FlipOutcome::LostByMoves;
            }
        }
        outcome
    }

    /// Flip a mismatched pair back down and release the board. Called by the
    /// presenter once its reveal delay has elapsed; a no-op unless a
    /// mismatch is actually pending.
    pub fn resolve_mismatch(&mut self) {
        if self.is_over() || !self.locked || self.open.len() != 2 {
            return;
        }
        for index in self.open.drain(..) {
            self.tiles[index].state = TileState::FaceDown;
        }
        self.locked = false;
    }

    /// One second of countdown. Inert unless the round is running, so a
    /// stale tick aimed at a replaced round can never change anything.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != RoundPhase::Running {
            return TickOutcome::Ignored;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.phase = RoundPhase::Lost(LossReason::TimeExpired);
            self.locked = true;
            TickOutcome::LostByTime
        } else {
            TickOutcome::TimeUpdated(self.remaining_seconds)
        }
    }

    /// Pick a face-down pair for a temporary reveal. `None` when the
    /// difficulty disallows hints or no complete pair remains face-down.
    pub fn hint(&mut self) -> Option<(usize, usize)> {
        if !self.difficulty.hint_allowed() || self.is_over() {
            return None;
        }
        let pair = self
            .tiles
            .iter()
            .filter(|tile| tile.is_face_down())
            .map(|tile| (tile.face, tile.index))
            .into_group_map()
            .into_values()
            .filter(|indices| indices.len() >= 2)
            .map(|indices| (indices[0], indices[1]))
            .min();
        if pair.is_some() {
            self.hints_used += 1;
        }
        pair
    }
}
