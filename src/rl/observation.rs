use std::{fmt, str::FromStr};

use burn::tensor::{Tensor, TensorData, backend::Backend};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::{GameState, Position, Snake};

/// How snakes and the board edge are encoded in the observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObservationType {
    /// Snake segments numbered from 1 at the tail up to the length at the head
    #[serde(rename = "flat-num")]
    FlatNum,
    /// `FlatNum` surrounded by a border of -1
    #[serde(rename = "bordered-num")]
    BorderedNum,
    /// Head marked 5, every other segment 1
    #[default]
    #[serde(rename = "flat-51s")]
    Flat51s,
    /// `Flat51s` surrounded by a border of -1
    #[serde(rename = "bordered-51s")]
    Bordered51s,
}

impl ObservationType {
    pub fn is_bordered(&self) -> bool {
        matches!(self, ObservationType::BorderedNum | ObservationType::Bordered51s)
    }

    fn as_str(&self) -> &'static str {
        match self {
            ObservationType::FlatNum => "flat-num",
            ObservationType::BorderedNum => "bordered-num",
            ObservationType::Flat51s => "flat-51s",
            ObservationType::Bordered51s => "bordered-51s",
        }
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObservationType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat-num" => Ok(ObservationType::FlatNum),
            "bordered-num" => Ok(ObservationType::BorderedNum),
            "flat-51s" => Ok(ObservationType::Flat51s),
            "bordered-51s" => Ok(ObservationType::Bordered51s),
            other => Err(GameError::InvalidConfig(format!(
                "unknown observation type {:?}",
                other
            ))),
        }
    }
}

/// Shape of the observation tensor: [1 + snakes, height, width]
pub fn observation_shape(state: &GameState, observation_type: ObservationType) -> [usize; 3] {
    let pad = if observation_type.is_bordered() { 2 } else { 0 };
    [
        1 + state.number_of_snakes(),
        state.grid_height + pad,
        state.grid_width + pad,
    ]
}

/// Create the observation tensor from game state
///
/// Channels:
/// - 0: Food (1.0 on food)
/// - 1 + id: Snake `id`, only while it is alive
///
/// Bordered variants add a one-cell frame of -1.0 around every channel.
///
/// Returns: Tensor<B, 3> with shape [1 + snakes, height, width]
pub fn create_observation<B: Backend>(
    state: &GameState,
    observation_type: ObservationType,
    device: &B::Device,
) -> Tensor<B, 3> {
    let mut channels = Vec::with_capacity(1 + state.number_of_snakes());
    channels.push(to_tensor::<B>(state, observation_type, food_channel(state), device));
    for snake in state.snakes.iter() {
        let data = snake_channel(state, snake, observation_type);
        channels.push(to_tensor::<B>(state, observation_type, data, device));
    }

    Tensor::stack(channels, 0)
}

fn cell_index(state: &GameState, pos: Position) -> Option<usize> {
    state
        .is_in_bounds(pos)
        .then(|| (pos.y as usize) * state.grid_width + (pos.x as usize))
}

/// Food channel (1.0 at food, 0.0 elsewhere)
fn food_channel(state: &GameState) -> Vec<f32> {
    let mut data = vec![0.0; state.grid_height * state.grid_width];
    for &pos in state.food.iter() {
        if let Some(idx) = cell_index(state, pos) {
            data[idx] = 1.0;
        }
    }
    data
}

/// Channel for a single snake; empty once the snake is dead
fn snake_channel(state: &GameState, snake: &Snake, observation_type: ObservationType) -> Vec<f32> {
    let mut data = vec![0.0; state.grid_height * state.grid_width];
    if !snake.alive {
        return data;
    }

    let len = snake.len();
    // Tail first so the head wins on stacked segments
    for (i, &pos) in snake.body.iter().enumerate().rev() {
        let Some(idx) = cell_index(state, pos) else {
            continue;
        };
        data[idx] = match observation_type {
            ObservationType::Flat51s | ObservationType::Bordered51s => {
                if i == 0 { 5.0 } else { 1.0 }
            }
            ObservationType::FlatNum | ObservationType::BorderedNum => (len - i) as f32,
        };
    }
    data
}

fn to_tensor<B: Backend>(
    state: &GameState,
    observation_type: ObservationType,
    data: Vec<f32>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let (width, height) = (state.grid_width, state.grid_height);
    if !observation_type.is_bordered() {
        return Tensor::<B, 2>::from_data(TensorData::new(data, [height, width]), device);
    }

    let padded_width = width + 2;
    let mut padded = vec![-1.0; (height + 2) * padded_width];
    for y in 0..height {
        let start = (y + 1) * padded_width + 1;
        padded[start..start + width].copy_from_slice(&data[y * width..(y + 1) * width]);
    }

    Tensor::<B, 2>::from_data(TensorData::new(padded, [height + 2, padded_width]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{FoodConfig, FoodLedger, Snake, SnakeStore};
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn test_state() -> GameState {
        let a = Snake::from_body(
            0,
            vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 3)],
            100,
        );
        let b = Snake::from_body(1, vec![Position::new(3, 0), Position::new(4, 0)], 100);
        let mut food = FoodLedger::new(5, 4, FoodConfig::default());
        food.insert(Position::new(2, 2));
        GameState::new(SnakeStore::new(vec![a, b], 100), food, 5, 4)
    }

    fn values(state: &GameState, observation_type: ObservationType) -> Vec<f32> {
        let device = NdArrayDevice::default();
        let obs = create_observation::<TestBackend>(state, observation_type, &device);
        obs.to_data().as_slice::<f32>().unwrap().to_vec()
    }

    #[test]
    fn test_observation_shape() {
        let device = NdArrayDevice::default();
        let state = test_state();

        let obs = create_observation::<TestBackend>(&state, ObservationType::Flat51s, &device);
        assert_eq!(obs.shape().dims, [3, 4, 5]);
        assert_eq!(observation_shape(&state, ObservationType::Flat51s), [3, 4, 5]);

        let obs = create_observation::<TestBackend>(&state, ObservationType::BorderedNum, &device);
        assert_eq!(obs.shape().dims, [3, 6, 7]);
        assert_eq!(observation_shape(&state, ObservationType::BorderedNum), [3, 6, 7]);
    }

    #[test]
    fn test_food_channel() {
        let state = test_state();
        let data = values(&state, ObservationType::Flat51s);

        // Channel 0, (x=2, y=2)
        assert_eq!(data[2 * 5 + 2], 1.0);
        assert_eq!(data[..20].iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_51s_channel() {
        let state = test_state();
        let data = values(&state, ObservationType::Flat51s);
        let channel = &data[20..40];

        assert_eq!(channel[5 + 1], 5.0); // head (1,1)
        assert_eq!(channel[2 * 5 + 1], 1.0);
        assert_eq!(channel[3 * 5 + 1], 1.0);
        assert_eq!(channel.iter().sum::<f32>(), 7.0);
    }

    #[test]
    fn test_numbered_channel() {
        let state = test_state();
        let data = values(&state, ObservationType::FlatNum);
        let channel = &data[20..40];

        assert_eq!(channel[5 + 1], 3.0); // head
        assert_eq!(channel[2 * 5 + 1], 2.0);
        assert_eq!(channel[3 * 5 + 1], 1.0); // tail

        let other = &data[40..60];
        assert_eq!(other[3], 2.0);
        assert_eq!(other[4], 1.0);
    }

    #[test]
    fn test_stacked_segments_show_head() {
        let snake = Snake::new(0, Position::new(2, 2), 3, 100);
        let food = FoodLedger::new(5, 5, FoodConfig::default());
        let state = GameState::new(SnakeStore::new(vec![snake], 100), food, 5, 5);

        let data = values(&state, ObservationType::Flat51s);
        assert_eq!(data[25 + 2 * 5 + 2], 5.0);

        let data = values(&state, ObservationType::FlatNum);
        assert_eq!(data[25 + 2 * 5 + 2], 3.0);
    }

    #[test]
    fn test_border_is_negative() {
        let state = test_state();
        let data = values(&state, ObservationType::Bordered51s);
        let (h, w) = (6, 7);

        for c in 0..3 {
            let channel = &data[c * h * w..(c + 1) * h * w];
            for x in 0..w {
                assert_eq!(channel[x], -1.0);
                assert_eq!(channel[(h - 1) * w + x], -1.0);
            }
            for y in 0..h {
                assert_eq!(channel[y * w], -1.0);
                assert_eq!(channel[y * w + w - 1], -1.0);
            }
        }

        // Food moves one cell down and right inside the border
        assert_eq!(data[3 * w + 3], 1.0);
        // Snake 0 head
        assert_eq!(data[h * w + 2 * w + 2], 5.0);
    }

    #[test]
    fn test_dead_snakes_are_hidden() {
        let mut state = test_state();
        state.snakes.kill(1);
        let data = values(&state, ObservationType::Flat51s);
        assert!(data[40..60].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_observation_type_parsing() {
        for observation_type in [
            ObservationType::FlatNum,
            ObservationType::BorderedNum,
            ObservationType::Flat51s,
            ObservationType::Bordered51s,
        ] {
            let parsed: ObservationType = observation_type.to_string().parse().unwrap();
            assert_eq!(parsed, observation_type);
        }
        assert!("flat".parse::<ObservationType>().is_err());
        assert_eq!(ObservationType::default(), ObservationType::Flat51s);
    }
}
