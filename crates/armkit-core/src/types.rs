use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{SpaceError, ValidationError};

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Flat f32 vector representing environment state.
///
/// For image observations the pixels are flattened channel-first
/// (CHW) with values in [0, 255].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    data: Vec<f32>,
}

impl Observation {
    pub const fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

impl std::ops::Index<usize> for Observation {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        &self.data[i]
    }
}

impl std::ops::IndexMut<usize> for Observation {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.data[i]
    }
}

impl From<Vec<f32>> for Observation {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Continuous control vector sent to the environment.
///
/// In primitive mode the first `num_primitives` entries are selection
/// logits and the remainder are primitive arguments in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    data: Vec<f32>,
}

impl Action {
    pub const fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Clip all values to [-1, 1].
    pub fn clip_normalized(&mut self) {
        for val in &mut self.data {
            *val = val.clamp(-1.0, 1.0);
        }
    }

    /// Validate action data (no NaN, no Inf).
    pub fn validate(&self) -> Result<(), ValidationError> {
        for val in &self.data {
            if val.is_nan() {
                return Err(ValidationError::ActionContainsNan);
            }
            if val.is_infinite() {
                return Err(ValidationError::ActionContainsInf);
            }
        }
        Ok(())
    }

    /// Index of the largest value in `range`. Ties go to the first maximum.
    ///
    /// Returns `None` when the range is empty or out of bounds.
    pub fn argmax(&self, range: std::ops::Range<usize>) -> Option<usize> {
        let slice = self.data.get(range.clone())?;
        if slice.is_empty() {
            return None;
        }
        let mut best = 0;
        for (i, v) in slice.iter().enumerate() {
            if *v > slice[best] {
                best = i;
            }
        }
        Some(range.start + best)
    }
}

impl std::ops::Index<usize> for Action {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        &self.data[i]
    }
}

impl From<Vec<f32>> for Action {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// ActionSpace
// ---------------------------------------------------------------------------

/// Box action space with per-dimension bounds. Follows Gymnasium conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl ActionSpace {
    /// Create a space from per-dimension bounds.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::DimensionMismatch`] when `low` and `high`
    /// differ in length.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, SpaceError> {
        if low.len() != high.len() {
            return Err(SpaceError::DimensionMismatch {
                low: low.len(),
                high: high.len(),
            });
        }
        Ok(Self { low, high })
    }

    /// Create a space with the same bounds on every dimension.
    pub fn uniform(dim: usize, low: f32, high: f32) -> Self {
        Self {
            low: vec![low; dim],
            high: vec![high; dim],
        }
    }

    pub const fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.low.len()]
    }

    pub fn low(&self) -> &[f32] {
        &self.low
    }

    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Sample a uniform random action. Takes `&mut impl Rng` for determinism.
    pub fn sample(&self, rng: &mut impl rand::Rng) -> Action {
        let data: Vec<f32> = self
            .low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| rng.gen_range(*l..=*h))
            .collect();
        Action::new(data)
    }

    pub fn contains(&self, action: &Action) -> bool {
        action.len() == self.low.len()
            && action
                .as_slice()
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| v >= l && v <= h)
    }

    /// Clamp every dimension into its bounds.
    pub fn clamp(&self, action: &mut Action) {
        for (v, (l, h)) in action
            .as_mut_slice()
            .iter_mut()
            .zip(self.low.iter().zip(self.high.iter()))
        {
            *v = v.clamp(*l, *h);
        }
    }
}

// ---------------------------------------------------------------------------
// ObservationSpace
// ---------------------------------------------------------------------------

/// Defines shape and bounds of valid observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservationSpace {
    /// Bounded f32 vector.
    Box { low: Vec<f32>, high: Vec<f32> },
    /// RGB image, flattened channel-first with values in [0, 255].
    Image { height: u32, width: u32, channels: u32 },
}

impl ObservationSpace {
    /// Image space with the standard 3 RGB channels.
    pub const fn rgb(height: u32, width: u32) -> Self {
        Self::Image {
            height,
            width,
            channels: 3,
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Box { low, .. } => vec![low.len()],
            Self::Image {
                height,
                width,
                channels,
            } => vec![*channels as usize, *height as usize, *width as usize],
        }
    }

    pub fn size(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn contains(&self, obs: &Observation) -> bool {
        match self {
            Self::Box { low, high } => {
                obs.len() == low.len()
                    && obs
                        .as_slice()
                        .iter()
                        .zip(low.iter().zip(high.iter()))
                        .all(|(v, (l, h))| v >= l && v <= h)
            }
            Self::Image { .. } => {
                obs.len() == self.size()
                    && obs.as_slice().iter().all(|v| (0.0..=255.0).contains(v))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StepResult / ResetResult
// ---------------------------------------------------------------------------

/// Result of `env.step(action)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    /// Episode ended due to task success/failure.
    pub terminated: bool,
    /// Episode ended due to the step limit.
    pub truncated: bool,
    pub info: StepInfo,
}

impl StepResult {
    /// True when either termination flag is set.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    pub episode_length: u32,
    pub episode_reward: f32,
    /// Name of the primitive executed this step, when in primitive mode.
    pub primitive: Option<String>,
    pub custom: HashMap<String, f32>,
}

/// Result of `env.reset()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResult {
    pub observation: Observation,
    pub info: ResetInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetInfo {
    pub seed: Option<u64>,
    pub custom: HashMap<String, f32>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Observation ----

    #[test]
    fn observation_new_and_len() {
        let obs = Observation::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(obs.len(), 3);
        assert!(!obs.is_empty());
    }

    #[test]
    fn observation_zeros() {
        let obs = Observation::zeros(5);
        assert_eq!(obs.len(), 5);
        assert_eq!(obs.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn observation_empty() {
        let obs = Observation::new(vec![]);
        assert!(obs.is_empty());
        assert_eq!(obs.len(), 0);
    }

    #[test]
    fn observation_indexing() {
        let mut obs = Observation::new(vec![10.0, 20.0, 30.0]);
        assert!((obs[1] - 20.0).abs() < f32::EPSILON);
        obs[1] = 99.0;
        assert!((obs[1] - 99.0).abs() < f32::EPSILON);
    }

    #[test]
    fn observation_into_vec() {
        let obs = Observation::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(obs.into_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn observation_from_vec() {
        let obs: Observation = vec![4.0, 5.0].into();
        assert_eq!(obs.len(), 2);
        assert!((obs[0] - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn observation_serialize_roundtrip() {
        let obs = Observation::new(vec![1.0, 2.0, 3.0]);
        let json = serde_json::to_string(&obs).unwrap();
        let obs2: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, obs2);
    }

    // ---- Action ----

    #[test]
    fn action_new_and_len() {
        let action = Action::new(vec![0.5, -0.5]);
        assert_eq!(action.len(), 2);
        assert!(!action.is_empty());
        assert_eq!(action.as_slice(), &[0.5, -0.5]);
    }

    #[test]
    fn action_zeros() {
        let action = Action::zeros(3);
        assert_eq!(action.len(), 3);
        assert_eq!(action.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn action_clip_normalized() {
        let mut action = Action::new(vec![-2.0, 0.5, 1.5]);
        action.clip_normalized();
        assert_eq!(action.as_slice(), &[-1.0, 0.5, 1.0]);
    }

    #[test]
    fn action_validate_ok() {
        let action = Action::new(vec![0.5, -0.3, 1.0]);
        assert!(action.validate().is_ok());
    }

    #[test]
    fn action_validate_nan() {
        let action = Action::new(vec![0.5, f32::NAN, 1.0]);
        let err = action.validate().unwrap_err();
        assert_eq!(err, ValidationError::ActionContainsNan);
    }

    #[test]
    fn action_validate_inf() {
        let action = Action::new(vec![f32::INFINITY, 0.5]);
        let err = action.validate().unwrap_err();
        assert_eq!(err, ValidationError::ActionContainsInf);

        let action = Action::new(vec![f32::NEG_INFINITY]);
        let err = action.validate().unwrap_err();
        assert_eq!(err, ValidationError::ActionContainsInf);
    }

    #[test]
    fn action_argmax_basic() {
        let action = Action::new(vec![0.1, 0.9, 0.3, 0.5]);
        assert_eq!(action.argmax(0..4), Some(1));
        assert_eq!(action.argmax(2..4), Some(3));
    }

    #[test]
    fn action_argmax_first_max_wins() {
        let action = Action::new(vec![0.7, 0.2, 0.7]);
        assert_eq!(action.argmax(0..3), Some(0));
    }

    #[test]
    fn action_argmax_empty_range() {
        let action = Action::new(vec![1.0, 2.0]);
        assert_eq!(action.argmax(1..1), None);
    }

    #[test]
    fn action_argmax_out_of_bounds() {
        let action = Action::new(vec![1.0, 2.0]);
        assert_eq!(action.argmax(0..5), None);
    }

    #[test]
    fn action_from_vec() {
        let action: Action = vec![1.0, 2.0].into();
        assert_eq!(action, Action::new(vec![1.0, 2.0]));
    }

    #[test]
    fn action_serialize_roundtrip() {
        let action = Action::new(vec![0.1, 0.2]);
        let json = serde_json::to_string(&action).unwrap();
        let action2: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, action2);
    }

    // ---- ActionSpace ----

    #[test]
    fn action_space_new_checks_dims() {
        let err = ActionSpace::new(vec![0.0; 3], vec![1.0; 2]).unwrap_err();
        assert_eq!(err, SpaceError::DimensionMismatch { low: 3, high: 2 });
    }

    #[test]
    fn action_space_uniform() {
        let space = ActionSpace::uniform(4, -1.0, 1.0);
        assert_eq!(space.dim(), 4);
        assert_eq!(space.shape(), vec![4]);
        assert_eq!(space.low(), &[-1.0; 4]);
        assert_eq!(space.high(), &[1.0; 4]);
    }

    #[test]
    fn action_space_mixed_bounds() {
        let space = ActionSpace::new(vec![0.0, -1.0], vec![1.0, 1.0]).unwrap();
        assert!(space.contains(&Action::new(vec![0.5, -0.5])));
        assert!(!space.contains(&Action::new(vec![-0.5, 0.0])));
    }

    #[test]
    fn action_space_contains() {
        let space = ActionSpace::uniform(2, 0.0, 1.0);
        assert!(space.contains(&Action::new(vec![0.5, 0.5])));
        assert!(space.contains(&Action::new(vec![0.0, 1.0])));
        assert!(!space.contains(&Action::new(vec![-0.1, 0.5])));
        assert!(!space.contains(&Action::new(vec![0.5, 1.1])));
        // wrong dimension
        assert!(!space.contains(&Action::new(vec![0.5])));
    }

    #[test]
    fn action_space_sample_in_bounds() {
        use rand::SeedableRng;
        let space = ActionSpace::new(vec![-1.0, -2.0], vec![1.0, 2.0]).unwrap();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let action = space.sample(&mut rng);
            assert!(space.contains(&action));
        }
    }

    #[test]
    fn action_space_sample_deterministic() {
        use rand::SeedableRng;
        let space = ActionSpace::uniform(3, -1.0, 1.0);
        let mut rng1 = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        assert_eq!(space.sample(&mut rng1), space.sample(&mut rng2));
    }

    #[test]
    fn action_space_clamp() {
        let space = ActionSpace::uniform(3, -1.0, 1.0);
        let mut action = Action::new(vec![-5.0, 0.3, 2.0]);
        space.clamp(&mut action);
        assert_eq!(action.as_slice(), &[-1.0, 0.3, 1.0]);
    }

    // ---- ObservationSpace ----

    #[test]
    fn obs_space_box_shape_size() {
        let space = ObservationSpace::Box {
            low: vec![-1.0; 3],
            high: vec![1.0; 3],
        };
        assert_eq!(space.shape(), vec![3]);
        assert_eq!(space.size(), 3);
    }

    #[test]
    fn obs_space_image_shape_size() {
        let space = ObservationSpace::rgb(64, 64);
        assert_eq!(space.shape(), vec![3, 64, 64]);
        assert_eq!(space.size(), 3 * 64 * 64);
    }

    #[test]
    fn obs_space_box_contains() {
        let space = ObservationSpace::Box {
            low: vec![0.0, 0.0],
            high: vec![1.0, 1.0],
        };
        assert!(space.contains(&Observation::new(vec![0.5, 0.5])));
        assert!(!space.contains(&Observation::new(vec![-0.1, 0.5])));
        assert!(!space.contains(&Observation::new(vec![0.5])));
    }

    #[test]
    fn obs_space_image_contains() {
        let space = ObservationSpace::rgb(2, 2);
        assert!(space.contains(&Observation::zeros(12)));
        assert!(space.contains(&Observation::new(vec![255.0; 12])));
        assert!(!space.contains(&Observation::new(vec![256.0; 12])));
        // wrong length
        assert!(!space.contains(&Observation::zeros(11)));
    }

    // ---- StepResult / ResetResult ----

    #[test]
    fn step_result_done() {
        let mut result = StepResult {
            observation: Observation::zeros(2),
            reward: 0.0,
            terminated: false,
            truncated: false,
            info: StepInfo::default(),
        };
        assert!(!result.done());
        result.truncated = true;
        assert!(result.done());
        result.truncated = false;
        result.terminated = true;
        assert!(result.done());
    }

    #[test]
    fn step_result_serialize_roundtrip() {
        let mut custom = HashMap::new();
        custom.insert("center_x".to_string(), 170.0);
        let result = StepResult {
            observation: Observation::new(vec![1.0]),
            reward: 0.5,
            terminated: true,
            truncated: false,
            info: StepInfo {
                episode_length: 5,
                episode_reward: 0.5,
                primitive: Some("lift".to_string()),
                custom,
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        let result2: StepResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.observation, result2.observation);
        assert_eq!(result.info.primitive, result2.info.primitive);
        assert_eq!(result.info.episode_length, result2.info.episode_length);
    }

    #[test]
    fn step_info_default() {
        let info = StepInfo::default();
        assert_eq!(info.episode_length, 0);
        assert!((info.episode_reward - 0.0).abs() < f32::EPSILON);
        assert_eq!(info.primitive, None);
        assert!(info.custom.is_empty());
    }

    #[test]
    fn reset_result_construction() {
        let result = ResetResult {
            observation: Observation::zeros(4),
            info: ResetInfo {
                seed: Some(42),
                custom: HashMap::new(),
            },
        };
        assert_eq!(result.observation.len(), 4);
        assert_eq!(result.info.seed, Some(42));
    }

    #[test]
    fn reset_info_default() {
        let info = ResetInfo::default();
        assert_eq!(info.seed, None);
        assert!(info.custom.is_empty());
    }
}
