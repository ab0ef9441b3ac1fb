use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use xiangqi_core::engine::config::Difficulty;
use xiangqi_core::logic::game::GameMode;

mod app;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// You play RED against the engine
    PlayerVsAi,
    /// The engine plays both sides
    AiVsAi,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PlayerVsAi => Self::PlayerVsAi,
            ModeArg::AiVsAi => Self::AiVsAi,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

/// Play Xiangqi (Chinese chess) in the terminal.
#[derive(Debug, Parser)]
#[command(name = "xiangqi", version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = ModeArg::PlayerVsAi)]
    mode: ModeArg,

    #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
    difficulty: DifficultyArg,

    /// JSON file with engine tuning multipliers
    #[arg(long)]
    engine_config: Option<PathBuf>,

    /// Stop after this many plies
    #[arg(long, default_value_t = 300)]
    max_plies: usize,

    /// Seed for the engine's random move choices
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = app::Settings {
        mode: cli.mode.into(),
        difficulty: cli.difficulty.into(),
        engine_config: cli.engine_config,
        max_plies: cli.max_plies,
        seed: cli.seed,
    };

    match app::run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
