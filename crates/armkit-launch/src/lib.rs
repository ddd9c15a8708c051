// armkit-launch: Experiment variants, hyperparameter sweeps, and run launching.

pub mod error;
pub mod experiment;
pub mod runner;
pub mod sweep;
pub mod variant;

pub use error::LaunchError;
pub use experiment::{bench_experiment, build_env, BenchSummary, ROLLOUT_FILE, SUMMARY_FILE};
pub use runner::{launch, run_experiment, LaunchOptions, SEED_RANGE, VARIANT_FILE};
pub use sweep::{DeterministicSweeper, SweepSpec};
pub use variant::{
    ActorParams, AlgorithmParams, ModelParams, TrainerParams, Variant, VfParams,
};
