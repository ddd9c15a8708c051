//! Experiment variant tree.
//!
//! A [`Variant`] is the full configuration of one experiment run: the
//! algorithm schedule, environment settings, network shapes, and trainer
//! hyperparameters. Every field has a serde default, so a partial TOML
//! file is enough:
//!
//! ```
//! use armkit_launch::variant::Variant;
//!
//! let variant: Variant = toml::from_str("seed = 7").unwrap();
//! assert_eq!(variant.seed, 7);
//! assert_eq!(variant.algorithm_params.batch_size, 417);
//! ```
//!
//! Variants are also the unit of hyperparameter sweeping: the sweeper
//! serializes a base variant to JSON, rewrites dot-separated paths, and
//! deserializes each combination back into a `Variant`.

use std::path::Path;

use armkit_env::config::{ControlMode, EnvConfig};
use serde::{Deserialize, Serialize};

use crate::error::LaunchError;

// ---------------------------------------------------------------------------
// Schedule parameters
// ---------------------------------------------------------------------------

/// Outer training-loop schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmParams {
    pub num_epochs: u32,
    pub num_eval_steps_per_epoch: u32,
    pub num_expl_steps_per_train_loop: u32,
    pub min_num_steps_before_training: u32,
    pub num_pretrain_steps: u32,
    pub num_train_loops_per_epoch: u32,
    pub num_trains_per_train_loop: u32,
    pub batch_size: u32,
    /// Steps per episode; also the environment episode length.
    pub max_path_length: u32,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            num_epochs: 1000,
            num_eval_steps_per_epoch: 30,
            num_expl_steps_per_train_loop: 60,
            min_num_steps_before_training: 2500,
            num_pretrain_steps: 100,
            num_train_loops_per_epoch: 20,
            num_trains_per_train_loop: 20,
            batch_size: 417,
            max_path_length: 5,
        }
    }
}

impl AlgorithmParams {
    /// Shrunken schedule for smoke-testing a run end to end.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            num_epochs: 5,
            num_eval_steps_per_epoch: 10,
            num_expl_steps_per_train_loop: 50,
            min_num_steps_before_training: 10,
            num_pretrain_steps: 10,
            num_train_loops_per_epoch: 1,
            num_trains_per_train_loop: 10,
            batch_size: 30,
            max_path_length: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Network parameters
// ---------------------------------------------------------------------------

/// Actor network settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorParams {
    pub discrete_continuous_dist: bool,
    pub init_std: f32,
    pub num_layers: u32,
    pub min_std: f32,
    pub dist: String,
}

impl Default for ActorParams {
    fn default() -> Self {
        Self {
            discrete_continuous_dist: true,
            init_std: 0.0,
            num_layers: 4,
            min_std: 0.1,
            dist: "tanh_normal_dreamer_v1".to_string(),
        }
    }
}

/// Value network settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfParams {
    pub num_layers: u32,
}

impl Default for VfParams {
    fn default() -> Self {
        Self { num_layers: 3 }
    }
}

/// World-model network settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub model_hidden_size: u32,
    pub stochastic_state_size: u32,
    pub deterministic_state_size: u32,
    pub embedding_size: u32,
    pub rssm_hidden_size: u32,
    pub reward_num_layers: u32,
    pub pred_discount_num_layers: u32,
    pub gru_layer_norm: bool,
    pub std_act: String,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            model_hidden_size: 400,
            stochastic_state_size: 50,
            deterministic_state_size: 200,
            embedding_size: 1024,
            rssm_hidden_size: 200,
            reward_num_layers: 2,
            pred_discount_num_layers: 3,
            gru_layer_norm: true,
            std_act: "sigmoid2".to_string(),
        }
    }
}

/// Trainer loss scales, learning rates, and horizons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    pub adam_eps: f32,
    pub discount: f32,
    pub lam: f32,
    pub forward_kl: bool,
    pub free_nats: f32,
    pub pred_discount_loss_scale: f32,
    pub kl_loss_scale: f32,
    pub transition_loss_scale: f32,
    pub actor_lr: f32,
    pub vf_lr: f32,
    pub world_model_lr: f32,
    pub reward_loss_scale: f32,
    pub use_pred_discount: bool,
    pub policy_gradient_loss_scale: f32,
    /// Schedule expression evaluated by the trainer, e.g. `"1e-4"`.
    pub actor_entropy_loss_schedule: String,
    pub target_update_period: u32,
    pub detach_rewards: bool,
    pub imagination_horizon: u32,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            adam_eps: 1e-5,
            discount: 0.8,
            lam: 0.95,
            forward_kl: false,
            free_nats: 1.0,
            pred_discount_loss_scale: 10.0,
            kl_loss_scale: 0.0,
            transition_loss_scale: 0.8,
            actor_lr: 8e-5,
            vf_lr: 8e-5,
            world_model_lr: 3e-4,
            reward_loss_scale: 2.0,
            use_pred_discount: true,
            policy_gradient_loss_scale: 1.0,
            actor_entropy_loss_schedule: "1e-4".to_string(),
            target_update_period: 100,
            detach_rewards: false,
            imagination_horizon: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Full configuration of one experiment run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub algorithm: String,
    pub version: String,
    pub replay_buffer_size: u64,
    pub algorithm_params: AlgorithmParams,
    /// Environment to run; `"dice"` adds the side-switch reward wrapper.
    pub env_name: String,
    /// `true` runs raw end-effector deltas instead of primitives.
    pub use_raw_actions: bool,
    pub env: EnvConfig,
    pub actor: ActorParams,
    pub vf: VfParams,
    pub model: ModelParams,
    pub trainer: TrainerParams,
    pub num_expl_envs: u32,
    pub num_eval_envs: u32,
    pub expl_amount: f32,
    pub seed: u64,
    pub exp_id: u32,
}

impl Default for Variant {
    fn default() -> Self {
        Self {
            algorithm: "DreamerV2".to_string(),
            version: "normal".to_string(),
            replay_buffer_size: 500_000,
            algorithm_params: AlgorithmParams::default(),
            env_name: "dice".to_string(),
            use_raw_actions: false,
            env: EnvConfig::default(),
            actor: ActorParams::default(),
            vf: VfParams::default(),
            model: ModelParams::default(),
            trainer: TrainerParams::default(),
            num_expl_envs: 10,
            num_eval_envs: 1,
            expl_amount: 0.3,
            seed: 0,
            exp_id: 0,
        }
    }
}

impl Variant {
    /// Load a variant from a TOML file, filling missing fields with defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Replace the schedule with [`AlgorithmParams::debug`] and mark the
    /// version accordingly.
    #[must_use]
    pub fn with_debug_schedule(mut self) -> Self {
        self.algorithm_params = AlgorithmParams::debug();
        self.version = "debug".to_string();
        self
    }

    /// Environment configuration with the run-level fields reconciled.
    ///
    /// `use_raw_actions` picks the control mode and `max_path_length`
    /// overrides the episode length, so the schedule and the environment
    /// cannot drift apart.
    #[must_use]
    pub fn env_config(&self) -> EnvConfig {
        let mut config = self.env.clone();
        config.control_mode = if self.use_raw_actions {
            ControlMode::Raw
        } else {
            ControlMode::Primitive
        };
        config.episode_len = self.algorithm_params.max_path_length;
        config
    }

    /// Directory name for this run: `<exp_id>_<seed>`.
    #[must_use]
    pub fn run_name(&self) -> String {
        format!("{}_{}", self.exp_id, self.seed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
