use super::observation::{ObservationType, create_observation, observation_shape};
use crate::error::{GameError, Result};
use crate::game::{
    Direction, GameConfig, GameEngine, GameState, InitialState, RewardPolicy, SimpleRewards,
    StepInfo,
};
use burn::tensor::{Tensor, backend::Backend};

/// Output of [`SnakeGym::reset`] and [`SnakeGym::step`]
#[derive(Debug, Clone)]
pub struct GymStep<B: Backend> {
    /// Tensor<B, 3> with shape [1 + snakes, height, width]
    pub observation: Tensor<B, 3>,
    /// Reward per snake; empty after a reset
    pub rewards: Vec<f32>,
    /// Per-snake done flags (done means dead)
    pub dones: Vec<bool>,
    /// Episode over: at most one snake left out of several
    pub terminal: bool,
    pub info: StepInfo,
}

/// Multi-agent Snake environment for reinforcement learning
///
/// Wraps the game engine and provides a Burn-compatible interface with:
/// - Tensor observations (food channel plus one channel per snake)
/// - Discrete action space per snake (4 actions: Up, Down, Left, Right)
/// - Standard RL interface (reset, step)
pub struct SnakeGym<B: Backend, R = SimpleRewards> {
    engine: GameEngine<R>,
    state: GameState,
    observation_type: ObservationType,
    device: B::Device,
    episode: usize,
}

impl<B: Backend> SnakeGym<B, SimpleRewards> {
    /// Create a new environment using the configured reward table
    pub fn new(
        config: GameConfig,
        observation_type: ObservationType,
        device: B::Device,
    ) -> Result<Self> {
        let rewards = config.rewards.clone();
        Self::with_rewards(config, rewards, observation_type, device)
    }
}

impl<B: Backend, R: RewardPolicy> SnakeGym<B, R> {
    /// Create a new environment with a custom reward policy
    pub fn with_rewards(
        config: GameConfig,
        rewards: R,
        observation_type: ObservationType,
        device: B::Device,
    ) -> Result<Self> {
        let mut engine = GameEngine::with_rewards(config, rewards)?;
        let state = engine.reset()?;
        Ok(Self {
            engine,
            state,
            observation_type,
            device,
            episode: 0,
        })
    }

    /// Start from an explicit mid-game layout instead of random spawns
    ///
    /// Fails if the layout disagrees with the configured board size or
    /// snake count.
    pub fn from_initial_state(
        config: GameConfig,
        rewards: R,
        initial: &InitialState,
        observation_type: ObservationType,
        device: B::Device,
    ) -> Result<Self> {
        let engine = GameEngine::with_rewards(config, rewards)?;
        let state = engine.load_state(initial)?;
        Ok(Self {
            engine,
            state,
            observation_type,
            device,
            episode: 0,
        })
    }

    /// Reset the environment and start a new episode
    pub fn reset(&mut self) -> Result<GymStep<B>> {
        self.state = self.engine.reset()?;
        self.episode += 1;

        Ok(GymStep {
            observation: self.get_observation(),
            rewards: Vec::new(),
            dones: self.state.dones(),
            terminal: false,
            info: self.engine.initial_info(&self.state),
        })
    }

    /// Step the environment with one discrete action per snake
    ///
    /// Actions:
    /// - 0: Move Up
    /// - 1: Move Down
    /// - 2: Move Left
    /// - 3: Move Right
    ///
    /// Any other index is rejected before the turn is applied.
    pub fn step(&mut self, actions: &[usize]) -> Result<GymStep<B>> {
        let directions = actions
            .iter()
            .enumerate()
            .map(|(snake_id, &action)| {
                Direction::from_index(action).ok_or(GameError::InvalidAction { snake_id, action })
            })
            .collect::<Result<Vec<_>>>()?;

        self.step_directions(&directions)
    }

    /// Step the environment with one direction per snake
    pub fn step_directions(&mut self, directions: &[Direction]) -> Result<GymStep<B>> {
        let result = self
            .engine
            .step(&mut self.state, directions, Some(self.episode))?;

        Ok(GymStep {
            observation: self.get_observation(),
            rewards: result.rewards,
            dones: result.dones,
            terminal: result.terminal,
            info: result.info,
        })
    }

    /// Get current observation without stepping
    pub fn get_observation(&self) -> Tensor<B, 3> {
        create_observation(&self.state, self.observation_type, &self.device)
    }

    /// Shape of every observation this environment produces
    pub fn observation_shape(&self) -> [usize; 3] {
        observation_shape(&self.state, self.observation_type)
    }

    /// Number of discrete actions per snake
    pub fn action_count(&self) -> usize {
        Direction::ALL.len()
    }

    pub fn number_of_snakes(&self) -> usize {
        self.state.number_of_snakes()
    }

    /// Episodes started by `reset`
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Get the device used by this environment
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Get reference to current game state (for testing/debugging)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{FoodConfig, Position, RewardEvent, SnakeLayout};
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn gym(config: GameConfig) -> SnakeGym<TestBackend> {
        SnakeGym::new(config, ObservationType::Flat51s, NdArrayDevice::default()).unwrap()
    }

    #[test]
    fn test_environment_creation() {
        let env = gym(GameConfig::default().with_seed(1));

        assert_eq!(env.number_of_snakes(), 4);
        assert_eq!(env.state().alive_count(), 4);
        assert_eq!(env.state().turn_count, 0);
        assert_eq!(env.episode(), 0);
        assert_eq!(env.action_count(), 4);
    }

    #[test]
    fn test_reset_returns_valid_observation() {
        let mut env = gym(GameConfig::default().with_seed(1));

        let out = env.reset().unwrap();

        assert_eq!(out.observation.shape().dims, [5, 15, 15]);
        assert!(out.rewards.is_empty());
        assert_eq!(out.dones, vec![false; 4]);
        assert!(!out.terminal);
        assert_eq!(out.info.current_turn, 0);
        assert_eq!(out.info.snake_health, vec![100; 4]);
        assert_eq!(env.episode(), 1);
    }

    #[test]
    fn test_step_returns_correct_shapes() {
        let mut env = gym(GameConfig::small().with_seed(2));

        let out = env.step(&[0, 0]).unwrap();

        assert_eq!(out.observation.shape().dims, [3, 7, 7]);
        assert_eq!(out.rewards.len(), 2);
        assert_eq!(out.dones.len(), 2);
        assert_eq!(out.info.current_turn, 1);
        assert!(out.rewards.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_invalid_action_is_rejected() {
        let mut env = gym(GameConfig::small().with_seed(2));
        let before = env.state().clone();

        let err = env.step(&[0, 4]).unwrap_err();

        assert_eq!(
            err,
            GameError::InvalidAction {
                snake_id: 1,
                action: 4
            }
        );
        assert_eq!(env.state(), &before);
    }

    #[test]
    fn test_missing_action_is_rejected() {
        let mut env = gym(GameConfig::small().with_seed(2));
        let err = env.step(&[0]).unwrap_err();
        assert_eq!(err, GameError::ActionCountMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_bordered_observation_shape() {
        let env = SnakeGym::<TestBackend>::new(
            GameConfig::small().with_seed(3),
            ObservationType::BorderedNum,
            NdArrayDevice::default(),
        )
        .unwrap();

        assert_eq!(env.observation_shape(), [3, 9, 9]);
        assert_eq!(env.get_observation().shape().dims, [3, 9, 9]);
    }

    #[test]
    fn test_from_initial_state_food_reward() {
        let mut config = GameConfig::solo(7, 7).with_seed(4);
        config.food = FoodConfig {
            initial_food: Some(0),
            minimum_food: 0,
            spawn_chance: 0.0,
            spawn_locations: Vec::new(),
        };
        config.rewards.ate_food = 10.0;
        let initial = InitialState {
            grid_width: 7,
            grid_height: 7,
            turn_count: 0,
            snakes: vec![SnakeLayout {
                body: vec![Position::new(3, 3), Position::new(3, 4)],
                health: 20,
            }],
            food: vec![Position::new(3, 2)],
        };
        let rewards = config.rewards.clone();
        let mut env = SnakeGym::<TestBackend>::from_initial_state(
            config,
            rewards,
            &initial,
            ObservationType::Flat51s,
            NdArrayDevice::default(),
        )
        .unwrap();

        let out = env.step(&[0]).unwrap();

        // ate_food + another_turn
        assert_eq!(out.rewards, vec![11.0]);
        assert_eq!(out.info.events[0], vec![RewardEvent::AteFood, RewardEvent::AnotherTurn]);
        assert_eq!(out.info.snake_health, vec![100]);
        assert_eq!(env.state().snakes.body(0).len(), 3);
    }

    #[test]
    fn test_initial_state_mismatch_fails() {
        let initial = InitialState {
            grid_width: 9,
            grid_height: 7,
            turn_count: 0,
            snakes: vec![],
            food: vec![],
        };
        let result = SnakeGym::<TestBackend>::from_initial_state(
            GameConfig::small(),
            SimpleRewards::default(),
            &initial,
            ObservationType::Flat51s,
            NdArrayDevice::default(),
        );
        assert!(matches!(result, Err(GameError::MapSizeMismatch { .. })));
    }

    #[test]
    fn test_episode_counter_reaches_rewards() {
        let policy = |event: RewardEvent, _id: usize, episode: Option<usize>| {
            if event == RewardEvent::AnotherTurn {
                episode.unwrap_or(0) as f32
            } else {
                0.0
            }
        };
        let mut config = GameConfig::solo(9, 9).with_seed(5);
        config.snake_spawn_locations = vec![Position::new(4, 4)];
        let mut env = SnakeGym::<TestBackend, _>::with_rewards(
            config,
            policy,
            ObservationType::Flat51s,
            NdArrayDevice::default(),
        )
        .unwrap();

        env.reset().unwrap();
        env.reset().unwrap();
        let out = env.step(&[0]).unwrap();

        assert_eq!(out.dones, vec![false]);
        assert_eq!(out.rewards, vec![2.0]);
        assert_eq!(env.episode(), 2);
    }

    #[test]
    fn test_multiple_episodes() {
        let mut env = gym(GameConfig::small().with_seed(6));

        for _ in 0..2 {
            env.reset().unwrap();
            let mut turns = 0;
            let mut terminal = false;

            while !terminal && turns < 200 {
                let out = env.step(&[0, 1]).unwrap();
                terminal = out.terminal;
                turns += 1;
            }

            // Moving straight into opposite walls ends quickly
            assert!(terminal);
        }
    }
}
