//! Run directories and the launch loop.
//!
//! [`launch`] expands a sweep, then starts one run per variant and seed.
//! Each run gets its own directory under `<base_dir>/<exp_prefix>/`, named
//! `<exp_id>_<seed>`, with the resolved variant written to `variant.json`
//! before the experiment function is invoked.

use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::LaunchError;
use crate::sweep::{DeterministicSweeper, SweepSpec};
use crate::variant::Variant;

/// File name the resolved variant is written to inside each run directory.
pub const VARIANT_FILE: &str = "variant.json";

/// Seeds are drawn uniformly from `0..SEED_RANGE` per run.
pub const SEED_RANGE: u64 = 100_000;

// ---------------------------------------------------------------------------
// LaunchOptions
// ---------------------------------------------------------------------------

/// Where and how many runs to launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Experiment group name; becomes a directory under `base_dir`.
    pub exp_prefix: String,
    pub base_dir: PathBuf,
    /// Runs per variant, each with a freshly drawn seed.
    pub num_seeds: u32,
    /// Seeds the RNG that draws per-run seeds.
    pub master_seed: u64,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            exp_prefix: "test".to_string(),
            base_dir: PathBuf::from("data"),
            num_seeds: 1,
            master_seed: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// run_experiment / launch
// ---------------------------------------------------------------------------

/// Prepare a run directory for one resolved variant and invoke the
/// experiment function in it.
///
/// Returns the run directory on success.
pub fn run_experiment<F>(
    variant: &Variant,
    base_dir: &Path,
    exp_prefix: &str,
    run: F,
) -> Result<PathBuf, LaunchError>
where
    F: FnOnce(&Variant, &Path) -> Result<(), LaunchError>,
{
    let run_dir = base_dir.join(exp_prefix).join(variant.run_name());
    fs::create_dir_all(&run_dir)?;
    let json = serde_json::to_string_pretty(variant)?;
    fs::write(run_dir.join(VARIANT_FILE), json)?;
    info!(
        exp_id = variant.exp_id,
        seed = variant.seed,
        dir = %run_dir.display(),
        "starting run"
    );
    run(variant, &run_dir)?;
    Ok(run_dir)
}

/// Expand the sweep and run every variant `num_seeds` times.
///
/// Variants are numbered by their position in the sweep expansion; seeds
/// are drawn from a ChaCha8 RNG seeded with `master_seed`, so a launch is
/// reproducible end to end.
pub fn launch<F>(
    base: Variant,
    spec: SweepSpec,
    options: &LaunchOptions,
    mut run: F,
) -> Result<Vec<PathBuf>, LaunchError>
where
    F: FnMut(&Variant, &Path) -> Result<(), LaunchError>,
{
    let variants = DeterministicSweeper::new(base, spec).variants()?;
    let mut rng = ChaCha8Rng::seed_from_u64(options.master_seed);
    let mut dirs = Vec::new();
    for (exp_id, variant) in (0u32..).zip(variants) {
        for _ in 0..options.num_seeds {
            let mut resolved = variant.clone();
            resolved.exp_id = exp_id;
            resolved.seed = rng.gen_range(0..SEED_RANGE);
            let dir = run_experiment(&resolved, &options.base_dir, &options.exp_prefix, &mut run)?;
            dirs.push(dir);
        }
    }
    info!(runs = dirs.len(), prefix = %options.exp_prefix, "launch finished");
    Ok(dirs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
