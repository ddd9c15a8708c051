//! Built-in benchmark experiment.
//!
//! [`bench_experiment`] is the experiment function the CLI wires into
//! [`launch`](crate::runner::launch): it builds the simulated environment
//! stack the variant describes, runs one seeded random-policy rollout per
//! epoch, and leaves `rollouts.jsonl` plus a `bench.json` summary in the
//! run directory.

use std::fs;
use std::path::Path;

use armkit_core::seed::{SeedHierarchy, derive_seed};
use armkit_driver::{SimArm, SimScene};
use armkit_env::config::ControlMode;
use armkit_env::{ArmEnv, Env, PrimitiveEnv, SideSwitchWrapper};
use armkit_policy::{EpisodeRecorder, RandomPolicy, RolloutStats, run_recorded_rollout};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LaunchError;
use crate::variant::Variant;

/// Per-step records, one JSON object per line.
pub const ROLLOUT_FILE: &str = "rollouts.jsonl";
/// Aggregate statistics for the whole run.
pub const SUMMARY_FILE: &str = "bench.json";

// ---------------------------------------------------------------------------
// BenchSummary
// ---------------------------------------------------------------------------

/// Aggregate results written to [`SUMMARY_FILE`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchSummary {
    pub episodes: usize,
    pub total_steps: u64,
    pub mean_reward: f32,
    /// Mean wall-clock episode duration, first episode excluded.
    pub mean_episode_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Environment stack
// ---------------------------------------------------------------------------

/// Build the simulated environment a variant describes.
///
/// `use_raw_actions` selects raw deltas or primitives; an `env_name` of
/// `"dice"` adds the side-switch reward wrapper over a fresh scene camera.
pub fn build_env(variant: &Variant) -> Result<Box<dyn Env>, LaunchError> {
    let config = variant.env_config();
    let scene = SimScene::default();
    let arm = Box::new(SimArm::default().with_seed(derive_seed(variant.seed, "arm")));
    let base: Box<dyn Env> = match config.control_mode {
        ControlMode::Raw => Box::new(ArmEnv::new(config, arm, Box::new(scene.camera()))?),
        ControlMode::Primitive => Box::new(PrimitiveEnv::new(config, arm, Box::new(scene.camera()))?),
    };
    if variant.env_name == "dice" {
        return Ok(Box::new(SideSwitchWrapper::with_defaults(
            base,
            Box::new(scene.camera()),
        )));
    }
    Ok(base)
}

// ---------------------------------------------------------------------------
// bench_experiment
// ---------------------------------------------------------------------------

/// Run the benchmark described by a resolved variant inside its run
/// directory.
///
/// One rollout per epoch, `max_path_length` steps each, with episode seeds
/// derived from the variant seed.
pub fn bench_experiment(variant: &Variant, run_dir: &Path) -> Result<(), LaunchError> {
    let mut env = build_env(variant)?;
    let policy = RandomPolicy::new(
        env.action_space().clone(),
        derive_seed(variant.seed, "policy"),
    );
    let seeds = SeedHierarchy::new(variant.seed);
    let mut recorder = EpisodeRecorder::create(&run_dir.join(ROLLOUT_FILE))?;
    let mut stats = RolloutStats::new();

    let episodes = variant.algorithm_params.num_epochs;
    let max_steps = variant.algorithm_params.max_path_length;
    for episode in 0..episodes {
        let seed = seeds.episode_seed(u64::from(episode));
        let rollout = run_recorded_rollout(
            env.as_mut(),
            &policy,
            Some(seed),
            max_steps,
            episode,
            &mut recorder,
        )?;
        stats.push(rollout);
    }

    let summary = BenchSummary {
        episodes: stats.len(),
        total_steps: stats.total_steps(),
        mean_reward: stats.mean_reward(),
        mean_episode_ms: stats
            .mean_duration_skipping_first()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
    };
    fs::write(
        run_dir.join(SUMMARY_FILE),
        serde_json::to_string_pretty(&summary)?,
    )?;
    info!(
        episodes = summary.episodes,
        total_steps = summary.total_steps,
        mean_reward = summary.mean_reward,
        "bench finished"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
