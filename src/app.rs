use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use xiangqi_core::engine::config::{Difficulty, EngineConfig};
use xiangqi_core::engine::parse_move_squares;
use xiangqi_core::engine::search::AlphaBetaEngine;
use xiangqi_core::logic::game::{GameMode, GameState, GameStatus};
use xiangqi_core::logic::rules::MoveError;
use xiangqi_core::worker::{BoardSnapshot, Input, Output, SearchWorker, WorkerError};

pub struct Settings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub engine_config: Option<PathBuf>,
    pub max_plies: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error("engine produced an illegal move: {0}")]
    IllegalMove(#[from] MoveError),
    #[error("engine failed: {0}")]
    Engine(String),
}

enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
commands:
  <from><to>   play a move, e.g. h7e7 or \"h7 e7\"
  moves        list legal moves
  undo         take back your last move
  fen          print the position as FEN
  new          start over
  quit         leave the game";

pub fn run(settings: &Settings) -> Result<(), RunError> {
    let config = Arc::new(load_engine_config(settings.engine_config.as_deref())?);
    let engine = settings.seed.map_or_else(
        || AlphaBetaEngine::new(config.clone()),
        |seed| AlphaBetaEngine::with_seed(config.clone(), seed),
    );
    let worker = SearchWorker::spawn_with_engine(engine);

    let mut game = GameState::new();
    game.new_game(settings.mode, settings.difficulty);
    print_position(&game);
    if settings.mode == GameMode::PlayerVsAi {
        println!("{HELP}");
    }

    let mut lines = io::stdin().lines();

    while !game.status.is_over() && game.history.len() < settings.max_plies {
        if game.is_player_turn() {
            print!("{}> ", game.turn);
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            if matches!(handle_command(&mut game, line?.trim()), Flow::Quit) {
                return Ok(());
            }
        } else if !play_engine_move(&mut game, &worker)? {
            break;
        }
    }

    announce_result(&game);
    Ok(())
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, RunError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path)?;
    let config = EngineConfig::load_from_json(&json)?;
    log::info!("loaded engine config from {}", path.display());
    Ok(config)
}

fn handle_command(game: &mut GameState, command: &str) -> Flow {
    match command {
        "" => {}
        "quit" | "exit" => return Flow::Quit,
        "help" => println!("{HELP}"),
        "fen" => println!("{}", game.board.to_fen_string(game.turn)),
        "moves" => {
            let moves: Vec<String> = game.legal_moves().iter().map(ToString::to_string).collect();
            println!("{}", moves.join(" "));
        }
        "undo" => {
            if game.undo() == 0 {
                println!("nothing to undo");
            }
            print_position(game);
        }
        "new" => {
            game.new_game(game.mode, game.difficulty);
            print_position(game);
        }
        text => match parse_move_squares(text) {
            Some((from, to)) => match game.make_move_at(from, to) {
                Ok(mv) => {
                    println!("you play {mv}");
                    print_position(game);
                }
                Err(e) => println!("illegal move: {e}"),
            },
            None => println!("unrecognized command, type `help`"),
        },
    }
    Flow::Continue
}

/// Returns `false` when the engine could not move; the turn stays where it was.
fn play_engine_move(game: &mut GameState, worker: &SearchWorker) -> Result<bool, RunError> {
    let request = Input::FindBestMove {
        board: BoardSnapshot::from_board(&game.board),
        color: game.turn,
        difficulty: game.difficulty,
    };
    match worker.request(request)? {
        Output::MoveFound(mv) => {
            let mover = game.turn;
            let played = game.make_move(mv)?;
            println!("{mover} plays {played}");
            print_position(game);
            Ok(true)
        }
        Output::Error(message) => {
            println!("AI could not move: {message}");
            Ok(false)
        }
        Output::Configured => Err(RunError::Engine("unexpected reply".to_string())),
    }
}

fn print_position(game: &GameState) {
    println!();
    print!("{}", game.board);
    println!("{}", game.board.to_fen_string(game.turn));
    if let Some(mv) = game.history.last_move() {
        println!("last move: {mv}");
    }
    if game.is_in_check() && !game.status.is_over() {
        println!("{} is in check", game.turn);
    }
}

fn announce_result(game: &GameState) {
    match game.status {
        GameStatus::RedWin => println!("RED wins"),
        GameStatus::BlackWin => println!("BLACK wins"),
        GameStatus::Draw => println!("draw"),
        GameStatus::Playing => println!("stopped after {} plies", game.history.len()),
    }
}
