//! Backend type aliases and device management
//!
//! Observations are small grids, so the NdArray (CPU) backend is enough for
//! building tensors and feeding them to an inference model.
//!
//! # Example
//!
//! ```rust
//! use snake_gym::game::GameConfig;
//! use snake_gym::rl::{InferenceBackend, ObservationType, SnakeGym, default_device};
//!
//! let config = GameConfig::small().with_seed(7);
//! let mut env =
//!     SnakeGym::<InferenceBackend>::new(config, ObservationType::Flat51s, default_device())
//!         .unwrap();
//! let out = env.reset().unwrap();
//! assert_eq!(out.observation.shape().dims, [3, 7, 7]);
//! ```

use burn::backend::ndarray::{NdArray, NdArrayDevice};

/// Backend type for observations and inference
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
///
/// Returns the default NdArray device (CPU).
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
