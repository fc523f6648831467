use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use pairvault::destroyable::Destroyable;
use pairvault::events::Channel;
use pairvault::game::settings::Settings;
use pairvault::game::store::FileStore;
use pairvault::game::{GameEngine, StatsManager};
use pairvault::helpers::format_time;
use pairvault::model::{
    Difficulty, GameEngineCommand, GameEngineEvent, LossReason, Tile, TileState,
};

const MISMATCH_REVEAL: Duration = Duration::from_millis(700);
const BOARD_COLUMNS: usize = 4;

/// Presenter-side view of the engine, rebuilt from events.
#[derive(Default)]
struct View {
    board: Vec<Tile>,
    moves: u32,
    stars: u8,
    remaining_seconds: u32,
    total_seconds: u32,
    remaining_moves: Option<u32>,
    mismatch_pending: bool,
}

fn apply_event(view: &mut View, event: &GameEngineEvent) {
    match event {
        GameEngineEvent::BoardUpdated(tiles) => view.board = tiles.clone(),
        GameEngineEvent::MovesChanged(moves) => view.moves = *moves,
        GameEngineEvent::RemainingMovesChanged(remaining) => {
            view.remaining_moves = Some(*remaining);
        }
        GameEngineEvent::StarRatingChanged(stars) => view.stars = *stars,
        GameEngineEvent::TimerUpdated {
            remaining_seconds,
            total_seconds,
        } => {
            view.remaining_seconds = *remaining_seconds;
            view.total_seconds = *total_seconds;
        }
        GameEngineEvent::MismatchedPair(a, b) => {
            view.mismatch_pending = true;
            println!("No match: tiles {} and {} flip back.", a, b);
        }
        GameEngineEvent::HintRevealed(a, b) => {
            let face = view
                .board
                .get(*a)
                .map(|tile| tile.face.name())
                .unwrap_or("?");
            println!("Hint: tiles {} and {} both show {}.", a, b, face);
        }
        GameEngineEvent::RoundWon(record) => {
            println!(
                "You matched every pair! Time {}, {} moves, {}/3 stars.",
                record.time, record.moves, record.stars
            );
        }
        GameEngineEvent::RoundLost(reason) => match reason {
            LossReason::TimeExpired => println!("Time's up. Start a new round to try again."),
            LossReason::MovesExhausted => println!("Out of moves. Start a new round to try again."),
        },
        GameEngineEvent::BestScoreChanged(difficulty, best) => match best {
            Some(best) => println!(
                "Best on {}: {} / {} moves / {}★",
                difficulty, best.time, best.moves, best.stars
            ),
            None => println!("Best on {}: —", difficulty),
        },
        GameEngineEvent::LeaderboardUpdated(_, _) => {}
        GameEngineEvent::SettingsChanged(settings) => {
            println!(
                "Settings: difficulty {}, move limit {}, sound {}",
                settings.difficulty,
                if settings.move_limit_enabled { "on" } else { "off" },
                if settings.muted { "muted" } else { "on" }
            );
        }
    }
}

fn render(view: &View) {
    let matched = view.board.iter().filter(|t| t.is_matched()).count();
    let stars = "★".repeat(view.stars as usize);
    print!(
        "time {}/{} | moves {} | stars {} | pairs {}/{}",
        format_time(view.remaining_seconds),
        format_time(view.total_seconds),
        view.moves,
        stars,
        matched / 2,
        view.board.len() / 2
    );
    if let Some(remaining) = view.remaining_moves {
        print!(" | moves left {}", remaining);
    }
    println!();

    for row in view.board.chunks(BOARD_COLUMNS) {
        for tile in row {
            let label = match tile.state {
                TileState::FaceDown => "???".to_string(),
                TileState::FaceUp => tile.face.name().to_string(),
                TileState::Matched => format!("[{}]", tile.face.name()),
            };
            print!("{:>3} {:<14}", tile.index, label);
        }
        println!();
    }
}

fn parse_difficulty(token: &str) -> Option<Difficulty> {
    Difficulty::all()
        .into_iter()
        .find(|difficulty| difficulty.key() == token)
}

fn print_help() {
    println!("commands:");
    println!("  flip <n>            flip the tile at index n");
    println!("  hint                reveal a matching pair (Easy/Medium)");
    println!("  new [easy|medium|hard]   start a fresh round");
    println!("  restart             fresh round, same difficulty");
    println!("  movelimit on|off    toggle the move-limit variant");
    println!("  mute on|off         toggle sound (for graphical front ends)");
    println!("  best | lb | export | share | clear | stats");
    println!("  help | quit");
}

fn main() {
    env_logger::init();

    let (command_emitter, command_observer) = Channel::new();
    let (event_emitter, event_observer) = Channel::new();

    let view: Rc<RefCell<View>> = Rc::new(RefCell::new(View::default()));
    let view_sink = view.clone();
    let _view_subscription = event_observer.subscribe(move |event: &GameEngineEvent| {
        apply_event(&mut view_sink.borrow_mut(), event);
    });

    let engine = GameEngine::new(
        command_observer,
        event_emitter,
        Settings::load(),
        StatsManager::new(Box::new(FileStore::new_default())),
    );

    println!("pairvault — match every pair before the clock or the move budget runs out.");
    print_help();
    command_emitter.emit(&GameEngineCommand::NewRound(None, Settings::seed_from_env()));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_tick = Instant::now();

    loop {
        // clock role: one Tick per elapsed wall second while the round runs
        let running = engine
            .borrow()
            .round()
            .map_or(false, |round| round.is_running());
        if running {
            for _ in 0..last_tick.elapsed().as_secs() {
                command_emitter.emit(&GameEngineCommand::Tick);
            }
        }
        if !running || last_tick.elapsed().as_secs() > 0 {
            last_tick = Instant::now();
        }

        render(&view.borrow());

        // presenter owns the mismatch reveal delay: show the open pair,
        // wait, then hand the board back to the engine
        if view.borrow().mismatch_pending {
            thread::sleep(MISMATCH_REVEAL);
            command_emitter.emit(&GameEngineCommand::ResolveMismatch);
            view.borrow_mut().mismatch_pending = false;
            render(&view.borrow());
        }
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["flip", index] | ["f", index] => match index.parse::<usize>() {
                Ok(index) => command_emitter.emit(&GameEngineCommand::SelectTile(index)),
                Err(_) => println!("flip needs a tile index"),
            },
            ["hint"] | ["h"] => command_emitter.emit(&GameEngineCommand::ShowHint),
            ["new"] => command_emitter.emit(&GameEngineCommand::NewRound(None, None)),
            ["new", difficulty] => match parse_difficulty(difficulty) {
                Some(difficulty) => {
                    command_emitter.emit(&GameEngineCommand::NewRound(Some(difficulty), None))
                }
                None => println!("unknown difficulty: {}", difficulty),
            },
            ["restart"] | ["r"] => command_emitter.emit(&GameEngineCommand::Restart),
            ["movelimit", toggle] => command_emitter.emit(&GameEngineCommand::ChangeSettings(
                pairvault::model::SettingsChange {
                    move_limit_enabled: Some(*toggle == "on"),
                    ..Default::default()
                },
            )),
            ["mute", toggle] => command_emitter.emit(&GameEngineCommand::ChangeSettings(
                pairvault::model::SettingsChange {
                    muted: Some(*toggle == "on"),
                    ..Default::default()
                },
            )),
            ["best"] => {
                let engine = engine.borrow();
                let difficulty = engine.settings().difficulty;
                match engine.stats().best(difficulty) {
                    Some(best) => println!(
                        "Best on {}: {} / {} moves / {}★",
                        difficulty, best.time, best.moves, best.stars
                    ),
                    None => println!("Best on {}: —", difficulty),
                }
            }
            ["lb"] => {
                let engine = engine.borrow();
                let difficulty = engine.settings().difficulty;
                let entries = engine.stats().leaderboard(difficulty);
                if entries.is_empty() {
                    println!("No records yet. Play and record a best!");
                }
                for (rank, entry) in entries.iter().enumerate() {
                    let recorded = entry
                        .recorded_at
                        .map(|at| DateTime::<Local>::from(at).format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!(
                        "#{} {} • {} moves • {}★  {}",
                        rank + 1,
                        entry.score.time,
                        entry.score.moves,
                        entry.score.stars,
                        recorded
                    );
                }
            }
            ["export"] => {
                let engine = engine.borrow();
                let difficulty = engine.settings().difficulty;
                match engine.stats().export_leaderboard_json(difficulty) {
                    Some(json) => println!("{}", json),
                    None => println!("Nothing to export."),
                }
            }
            ["share"] => {
                let engine = engine.borrow();
                let difficulty = engine.settings().difficulty;
                match engine.stats().share_summary(difficulty) {
                    Some(summary) => println!("{}", summary),
                    None => println!("No leaderboard entries to share."),
                }
            }
            ["clear"] => command_emitter.emit(&GameEngineCommand::ClearLeaderboard),
            ["stats"] => {
                let engine = engine.borrow();
                let difficulty = engine.settings().difficulty;
                let stats = engine.stats().global_stats(difficulty);
                println!(
                    "{}: {} played, {} won, {} lost, {} total, {} hints",
                    difficulty,
                    stats.games_played,
                    stats.games_won,
                    stats.games_lost,
                    format_time(stats.total_time_played.as_secs() as u32),
                    stats.total_hints_used
                );
            }
            ["help"] => print_help(),
            ["quit"] | ["q"] => {
                command_emitter.emit(&GameEngineCommand::Quit);
                break;
            }
            [] => {}
            _ => println!("unknown command; try 'help'"),
        }
    }

    engine.borrow_mut().destroy();
}
