//! Episode statistics for multi-agent runs
//!
//! Tracks episode lengths, total rewards, winners and how snakes died, using
//! rolling windows for the averaged values.

use std::collections::{BTreeMap, VecDeque};

use crate::game::{CollisionOutcome, GameState, StepInfo};

/// Episode statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use snake_gym::metrics::EpisodeStats;
///
/// let mut stats = EpisodeStats::new(100, 2);
/// stats.record_episode(40, 1.5);
/// stats.record_result(Some(1));
///
/// assert_eq!(stats.wins(1), 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct EpisodeStats {
    /// Episode lengths in turns (rolling window)
    episode_lengths: VecDeque<u32>,

    /// Summed reward of all snakes per episode (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Wins per snake id
    wins: Vec<usize>,

    /// Episodes that ended without a single winner
    draws: usize,

    /// Collision outcomes seen across every recorded turn
    outcomes: BTreeMap<CollisionOutcome, usize>,

    total_episodes: usize,
    total_turns: u64,
    window_size: usize,
}

impl EpisodeStats {
    /// Create a tracker keeping `window_size` episodes for rolling averages
    pub fn new(window_size: usize, number_of_snakes: usize) -> Self {
        Self {
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_rewards: VecDeque::with_capacity(window_size),
            wins: vec![0; number_of_snakes],
            draws: 0,
            outcomes: BTreeMap::new(),
            total_episodes: 0,
            total_turns: 0,
            window_size,
        }
    }

    /// Tally the collision outcomes of a single turn
    pub fn record_turn(&mut self, info: &StepInfo) {
        for outcome in info.outcomes.iter().flatten() {
            *self.outcomes.entry(*outcome).or_insert(0) += 1;
        }
    }

    /// Record the length and summed reward of a finished episode
    pub fn record_episode(&mut self, length: u32, total_reward: f32) {
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_rewards, total_reward, self.window_size);
        self.total_episodes += 1;
        self.total_turns += u64::from(length);
    }

    /// Tally the result of a multi-snake episode; `None` is a draw
    pub fn record_result(&mut self, winner: Option<usize>) {
        match winner {
            Some(id) => {
                if id >= self.wins.len() {
                    self.wins.resize(id + 1, 0);
                }
                self.wins[id] += 1;
            }
            None => self.draws += 1,
        }
    }

    /// Record an episode from its final state and return the winner
    ///
    /// Results are only tallied with more than one snake: a lone snake has
    /// nobody to beat, so it never wins and never draws.
    pub fn record_final_state(&mut self, state: &GameState, total_reward: f32) -> Option<usize> {
        self.record_episode(state.turn_count, total_reward);
        if state.number_of_snakes() < 2 {
            return None;
        }

        let winner = if state.alive_count() == 1 {
            state.snakes.iter().find(|snake| snake.alive).map(|snake| snake.id)
        } else {
            None
        };
        self.record_result(winner);
        winner
    }

    pub fn mean_episode_length(&self) -> f32 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<u32>() as f32 / self.episode_lengths.len() as f32
        }
    }

    pub fn mean_episode_reward(&self) -> f32 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
        }
    }

    pub fn wins(&self, snake_id: usize) -> usize {
        self.wins.get(snake_id).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn outcome_count(&self, outcome: CollisionOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_turns(&self) -> u64 {
        self.total_turns
    }

    /// One-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        let wins = self
            .wins
            .iter()
            .enumerate()
            .map(|(id, wins)| format!("{}:{}", id, wins))
            .collect::<Vec<_>>()
            .join(" ");
        let deaths = self
            .outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_fatal())
            .map(|(outcome, count)| format!("{:?}={}", outcome, count))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "Episodes: {} | Turns: {} | Len: {:.1} | Reward: {:.2} | Wins [{}] | Draws: {} | Deaths [{}]",
            self.total_episodes,
            self.total_turns,
            self.mean_episode_length(),
            self.mean_episode_reward(),
            wins,
            self.draws,
            deaths,
        )
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
