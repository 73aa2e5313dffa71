use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use snake_gym::game::{Direction, GameConfig, GameState};
use snake_gym::metrics::EpisodeStats;
use snake_gym::rl::{InferenceBackend, ObservationType, SnakeGym, default_device};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_gym")]
#[command(version, about = "Run multi-agent Snake episodes with a random policy")]
struct Cli {
    /// JSON game configuration; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Number of snakes
    #[arg(long)]
    snakes: Option<usize>,

    /// RNG seed for the engine and the random policy
    #[arg(long)]
    seed: Option<u64>,

    /// Observation encoding (flat-num, bordered-num, flat-51s, bordered-51s)
    #[arg(long, default_value = "flat-51s")]
    observation: ObservationType,

    /// Episodes to play
    #[arg(long, default_value = "10")]
    episodes: usize,

    /// Turn limit per episode
    #[arg(long, default_value = "500")]
    max_turns: u32,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(snakes) = self.snakes {
            config.number_of_snakes = snakes;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

/// Pick a random direction per snake, avoiding immediate reversals
fn random_actions<R: Rng>(state: &GameState, rng: &mut R) -> Vec<Direction> {
    state
        .snakes
        .iter()
        .map(|snake| {
            let allowed: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&direction| !snake.is_forbidden(direction))
                .collect();
            allowed.choose(rng).copied().unwrap_or(Direction::Up)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    let mut policy_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    tracing::info!(
        width = config.grid_width,
        height = config.grid_height,
        snakes = config.number_of_snakes,
        observation = %cli.observation,
        "starting snake gym"
    );

    let mut env =
        SnakeGym::<InferenceBackend>::new(config.clone(), cli.observation, default_device())
            .context("Failed to create environment")?;
    let mut stats = EpisodeStats::new(100, config.number_of_snakes);

    for _ in 0..cli.episodes {
        env.reset()?;
        let mut total_reward = 0.0;

        loop {
            let actions = random_actions(env.state(), &mut policy_rng);
            let out = env.step_directions(&actions)?;
            stats.record_turn(&out.info);
            total_reward += out.rewards.iter().sum::<f32>();

            let all_dead = out.dones.iter().all(|&done| done);
            if out.terminal || all_dead || out.info.current_turn >= cli.max_turns {
                break;
            }
        }

        let state = env.state();
        let winner = stats.record_final_state(state, total_reward);

        tracing::info!(
            episode = env.episode(),
            turns = state.turn_count,
            winner = ?winner,
            reward = total_reward,
            "episode finished"
        );
    }

    tracing::info!("{}", stats.format_summary());
    Ok(())
}
