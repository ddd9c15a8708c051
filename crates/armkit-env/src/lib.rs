// armkit-env: Gym-style arm environments: raw control, manipulation primitives, reward wrappers.

pub mod config;
pub mod dispatch;
pub mod episode;
pub mod error;
pub mod primitive_env;
pub mod primitives;
pub mod shell;
pub mod traits;
pub mod wrapper;

pub use config::{ControlMode, EnvConfig};
pub use dispatch::{DispatchPhase, DispatchRecord, Dispatcher};
pub use episode::{Episode, EpisodeState};
pub use error::{ConfigError, EnvError};
pub use primitive_env::PrimitiveEnv;
pub use primitives::{Primitive, PrimitiveSet, MAX_ARG_LEN};
pub use shell::{ArmEnv, RAW_ACTION_DIM, RAW_TRANSLATION_SCALE};
pub use traits::Env;
pub use wrapper::{SideSwitchWrapper, DEFAULT_DIVIDER_X};
