// armkit-core: Types, spaces, poses, seeds, errors for armkit manipulation environments.

pub mod error;
pub mod pose;
pub mod seed;
pub mod types;
