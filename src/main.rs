use anyhow::Result;
use clap::{Parser, ValueEnum};
use just_jump::game::GameConfig;
use just_jump::modes::{EvaluateConfig, EvaluateMode, TrainConfig, TrainMode};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "just_jump")]
#[command(version, about = "Obstacle-jumping game with a tabular Q-learning trainer")]
struct Cli {
    /// What to do with the model
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Game variant
    #[arg(long, default_value = "just-jump")]
    variant: Variant,

    /// Number of episodes to train or evaluate
    #[arg(long, default_value = "1000")]
    episodes: usize,

    /// Model file to save to (train) or load from (evaluate)
    #[arg(long, default_value = "models/just_jump.bin")]
    model: PathBuf,

    /// Continue training from the model file if it exists
    #[arg(long)]
    resume: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// End an episode after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Save a checkpoint every N episodes (train)
    #[arg(long, default_value = "50")]
    checkpoint_frequency: usize,

    /// Log progress every N episodes (train)
    #[arg(long, default_value = "1")]
    log_frequency: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train an agent with prioritized-replay Q-learning
    Train,
    /// Play a saved model greedily and report scores
    Evaluate,
}

#[derive(Clone, ValueEnum)]
enum Variant {
    /// Two obstacle heights: jump the small ones, dodge the tall ones
    JustJump,
    /// Floating stars that have to be touched mid-jump
    PluckStars,
}

impl Variant {
    fn game_config(&self) -> GameConfig {
        match self {
            Variant::JustJump => GameConfig::just_jump(),
            Variant::PluckStars => GameConfig::pluck_stars(),
        }
    }
}

fn init_logging() {
    env_logger::builder()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init()
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let game_config = cli.variant.game_config();

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.episodes, cli.model);
            config.game_config = game_config;
            config.resume = cli.resume;
            config.seed = cli.seed;
            config.max_steps_per_episode = cli.max_steps;
            config.checkpoint_frequency = cli.checkpoint_frequency;
            config.log_frequency = cli.log_frequency;

            let mut train_mode = TrainMode::new(config)?;
            train_mode.run()?;
        }
        Mode::Evaluate => {
            let mut config = EvaluateConfig::new(cli.model, cli.episodes);
            config.game_config = game_config;
            config.seed = cli.seed;
            if cli.max_steps.is_some() {
                config.max_steps_per_episode = cli.max_steps;
            }

            let mut evaluate_mode = EvaluateMode::new(config);
            evaluate_mode.run();
        }
    }

    Ok(())
}
