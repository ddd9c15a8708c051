//! Armkit robot-arm CLI.
//!
//! Provides four modes of operation:
//! - `rollout`: Run episodes in the simulated arm and print statistics
//! - `bench`: Time raw versus primitive control
//! - `launch`: Expand a hyperparameter sweep and run one benchmark per run
//! - `info`: Print workspace crate versions and configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use armkit_core::seed::{SeedHierarchy, derive_seed};
use armkit_env::{Env, EnvError, Primitive, PrimitiveSet};
use armkit_launch::{
    AlgorithmParams, LaunchOptions, SweepSpec, Variant, bench_experiment, build_env, launch,
};
use armkit_policy::{
    EpisodeRecorder, Policy, RandomPolicy, RolloutStats, ScriptedPolicy, ZeroPolicy,
    run_recorded_rollout, run_rollout,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Simulated robot-arm environments with motion primitives.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ControlArg {
    /// End-effector deltas, six values per step.
    Raw,
    /// Primitive-selection logits plus arguments.
    Primitives,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Zero,
    Random,
    Scripted,
}

#[derive(Subcommand)]
enum Commands {
    /// Run episodes in the simulated arm and print statistics.
    Rollout {
        /// Number of episodes to run.
        #[arg(short = 'n', long, default_value_t = 10)]
        episodes: u32,

        /// Control mode.
        #[arg(short, long, value_enum, default_value = "primitives")]
        control: ControlArg,

        /// Policy driving the arm.
        #[arg(short, long, value_enum, default_value = "random")]
        policy: PolicyArg,

        /// Root seed; omit for unseeded episodes.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Steps per episode.
        #[arg(short = 'l', long, default_value_t = 5)]
        episode_len: u32,

        /// Attach the side-switch reward wrapper.
        #[arg(long)]
        dice: bool,

        /// Record per-step JSONL to this file.
        #[arg(short, long)]
        record: Option<PathBuf>,
    },

    /// Time raw versus primitive control with a random policy.
    Bench {
        /// Episodes per control mode.
        #[arg(short = 'n', long, default_value_t = 10)]
        episodes: u32,

        /// Steps per raw-control episode.
        #[arg(long, default_value_t = 500)]
        raw_steps: u32,

        /// Steps per primitive-control episode.
        #[arg(long, default_value_t = 5)]
        primitive_steps: u32,

        /// Root seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },

    /// Expand a sweep and run the benchmark experiment per variant and seed.
    Launch {
        /// Variant TOML; defaults apply to missing fields.
        #[arg(short, long)]
        variant: Option<PathBuf>,

        /// Sweep JSON mapping variant paths to value arrays.
        #[arg(long)]
        sweep: Option<PathBuf>,

        /// Shrink the schedule and prefix the experiment name with "test".
        #[arg(short, long)]
        debug: bool,

        /// Experiment group name.
        #[arg(short, long, default_value = "test")]
        exp_prefix: String,

        /// Runs per variant, each with a fresh seed.
        #[arg(long, default_value_t = 1)]
        num_seeds: u32,

        /// Root directory for run directories.
        #[arg(short, long, default_value = "data")]
        base_dir: PathBuf,

        /// Seeds the per-run seed draws.
        #[arg(short, long, default_value_t = 0)]
        master_seed: u64,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

/// Canned pick-and-carry sequence for the scripted policy.
fn demo_script() -> Result<ScriptedPolicy, EnvError> {
    let set = PrimitiveSet::standard();
    let action = |primitive: Primitive, args: &[f32]| {
        let index = set
            .index_of(primitive)
            .expect("standard set holds every primitive");
        set.primitive_action(index, args)
    };
    Ok(ScriptedPolicy::new(vec![
        action(Primitive::TopGrasp, &[-0.5, 0.6])?,
        action(Primitive::Lift, &[0.5])?,
        action(Primitive::MoveLeft, &[0.8])?,
        action(Primitive::OpenGripper, &[0.8])?,
    ]))
}

fn run_rollout_cmd(
    episodes: u32,
    control: ControlArg,
    policy: PolicyArg,
    seed: Option<u64>,
    episode_len: u32,
    dice: bool,
    record: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let variant = Variant {
        env_name: if dice { "dice" } else { "plain" }.to_string(),
        use_raw_actions: matches!(control, ControlArg::Raw),
        algorithm_params: AlgorithmParams {
            max_path_length: episode_len,
            ..AlgorithmParams::default()
        },
        seed: seed.unwrap_or(0),
        ..Variant::default()
    };
    let mut env = build_env(&variant)?;

    let policy: Box<dyn Policy> = match policy {
        PolicyArg::Zero => Box::new(ZeroPolicy::new(env.action_space().dim())),
        PolicyArg::Random => Box::new(RandomPolicy::new(
            env.action_space().clone(),
            derive_seed(variant.seed, "policy"),
        )),
        PolicyArg::Scripted => {
            if matches!(control, ControlArg::Raw) {
                return Err("scripted policy requires primitive control".into());
            }
            Box::new(demo_script()?)
        }
    };

    let seeds = SeedHierarchy::new(variant.seed);
    let mut recorder = match &record {
        Some(path) => Some(EpisodeRecorder::create(path)?),
        None => None,
    };

    let mut stats = RolloutStats::new();
    for episode in 0..episodes {
        let episode_seed = seed.map(|_| seeds.episode_seed(u64::from(episode)));
        let rollout = match recorder.as_mut() {
            Some(rec) => run_recorded_rollout(
                env.as_mut(),
                policy.as_ref(),
                episode_seed,
                episode_len,
                episode,
                rec,
            )?,
            None => run_rollout(env.as_mut(), policy.as_ref(), episode_seed, episode_len)?,
        };
        stats.push(rollout);
        println!(
            "episode {}: steps={}, reward={:.3}",
            episode + 1,
            rollout.steps,
            rollout.total_reward
        );
    }

    println!();
    println!(
        "total: episodes={}, steps={}, mean_reward={:.3}",
        stats.len(),
        stats.total_steps(),
        stats.mean_reward()
    );
    if let Some(mean) = stats.mean_duration_skipping_first() {
        println!("mean episode time (after warm-up): {mean:.1?}");
    }
    if let Some(path) = record {
        println!("steps recorded to {}", path.display());
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn run_bench(
    episodes: u32,
    raw_steps: u32,
    primitive_steps: u32,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    for (label, raw, steps) in [
        ("raw", true, raw_steps),
        ("primitives", false, primitive_steps),
    ] {
        let variant = Variant {
            env_name: "plain".to_string(),
            use_raw_actions: raw,
            algorithm_params: AlgorithmParams {
                max_path_length: steps,
                ..AlgorithmParams::default()
            },
            seed,
            ..Variant::default()
        };
        let mut env = build_env(&variant)?;
        let policy = RandomPolicy::new(env.action_space().clone(), derive_seed(seed, "policy"));
        let seeds = SeedHierarchy::new(seed);

        let mut stats = RolloutStats::new();
        for episode in 0..episodes {
            stats.push(run_rollout(
                env.as_mut(),
                &policy,
                Some(seeds.episode_seed(u64::from(episode))),
                steps,
            )?);
        }

        let total_secs: f64 = stats
            .rollouts()
            .iter()
            .map(|r| r.duration.as_secs_f64())
            .sum();
        let steps_per_sec = if total_secs > 0.0 {
            stats.total_steps() as f64 / total_secs
        } else {
            0.0
        };
        println!(
            "{label}: episodes={}, steps={}, steps/s={steps_per_sec:.0}",
            stats.len(),
            stats.total_steps()
        );
        if let Some(mean) = stats.mean_duration_skipping_first() {
            println!("  mean episode time (after warm-up): {mean:.1?}");
        }
    }
    Ok(())
}

fn run_launch(
    variant: Option<PathBuf>,
    sweep: Option<PathBuf>,
    debug: bool,
    exp_prefix: String,
    num_seeds: u32,
    base_dir: PathBuf,
    master_seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut base = match variant {
        Some(path) => Variant::from_toml_file(path)?,
        None => Variant::default(),
    };
    let mut prefix = exp_prefix;
    if debug {
        base = base.with_debug_schedule();
        prefix = format!("test{prefix}");
    }
    let spec = match sweep {
        Some(path) => SweepSpec::from_json_str(&std::fs::read_to_string(path)?)?,
        None => SweepSpec::new(),
    };

    let options = LaunchOptions {
        exp_prefix: prefix,
        base_dir,
        num_seeds,
        master_seed,
    };
    let dirs = launch(base, spec, &options, bench_experiment)?;
    for dir in &dirs {
        println!("run: {}", dir.display());
    }
    println!();
    println!(
        "launched {} runs under {}",
        dirs.len(),
        options.base_dir.join(&options.exp_prefix).display()
    );
    Ok(())
}

fn run_info() {
    println!("armkit v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  armkit-core    {}", env!("CARGO_PKG_VERSION"));
    println!("  armkit-driver  {}", env!("CARGO_PKG_VERSION"));
    println!("  armkit-vision  {}", env!("CARGO_PKG_VERSION"));
    println!("  armkit-env     {}", env!("CARGO_PKG_VERSION"));
    println!("  armkit-policy  {}", env!("CARGO_PKG_VERSION"));
    println!("  armkit-launch  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Rollout {
            episodes,
            control,
            policy,
            seed,
            episode_len,
            dice,
            record,
        }) => run_rollout_cmd(episodes, control, policy, seed, episode_len, dice, record),
        Some(Commands::Bench {
            episodes,
            raw_steps,
            primitive_steps,
            seed,
        }) => run_bench(episodes, raw_steps, primitive_steps, seed),
        Some(Commands::Launch {
            variant,
            sweep,
            debug,
            exp_prefix,
            num_seeds,
            base_dir,
            master_seed,
        }) => run_launch(
            variant,
            sweep,
            debug,
            exp_prefix,
            num_seeds,
            base_dir,
            master_seed,
        ),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => {
            // Default: a short random rollout with primitives
            run_rollout_cmd(
                10,
                ControlArg::Primitives,
                PolicyArg::Random,
                None,
                5,
                false,
                None,
            )
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
