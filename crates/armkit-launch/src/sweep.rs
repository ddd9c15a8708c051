//! Deterministic hyperparameter sweeps.
//!
//! A [`SweepSpec`] lists dot-separated variant paths and the values to try
//! for each. [`DeterministicSweeper`] expands the spec into the full
//! cartesian product of variants, in a fixed order: the last path in the
//! spec varies fastest. An empty spec expands to the base variant alone,
//! so launching without a sweep still runs exactly once.
//!
//! Paths address the serialized variant tree, so anything serde can reach
//! can be swept: `"seed"`, `"trainer.discount"`, `"env.action_scale"`.

use serde_json::Value;

use crate::error::LaunchError;
use crate::variant::Variant;

// ---------------------------------------------------------------------------
// SweepSpec
// ---------------------------------------------------------------------------

/// Ordered list of variant paths and the values to sweep over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepSpec {
    entries: Vec<(String, Vec<Value>)>,
}

impl SweepSpec {
    /// An empty spec. Expands to the base variant alone.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a path to sweep over the given values.
    #[must_use]
    pub fn sweep(mut self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.entries.push((path.into(), values));
        self
    }

    /// Parse a spec from a JSON object mapping paths to value arrays:
    /// `{"trainer.discount": [0.8, 0.99], "seed": [1, 2, 3]}`.
    ///
    /// Paths are taken in the object's (alphabetical) key order.
    pub fn from_json_str(text: &str) -> Result<Self, LaunchError> {
        let object: serde_json::Map<String, Value> = serde_json::from_str(text)?;
        let mut entries = Vec::with_capacity(object.len());
        for (path, value) in object {
            match value {
                Value::Array(values) => entries.push((path, values)),
                other => {
                    return Err(LaunchError::InvalidValue {
                        path,
                        expected: "array",
                        got: kind_name(&other),
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    /// Number of swept paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The swept paths and their values, in sweep order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Vec<Value>)] {
        &self.entries
    }
}

// ---------------------------------------------------------------------------
// DeterministicSweeper
// ---------------------------------------------------------------------------

/// Expands a [`SweepSpec`] against a base [`Variant`] into the cartesian
/// product of all swept values.
#[derive(Clone, Debug)]
pub struct DeterministicSweeper {
    base: Variant,
    spec: SweepSpec,
}

impl DeterministicSweeper {
    #[must_use]
    pub const fn new(base: Variant, spec: SweepSpec) -> Self {
        Self { base, spec }
    }

    /// Number of variants the sweep expands to.
    ///
    /// An empty spec counts as one; a path with no values makes the whole
    /// product empty.
    #[must_use]
    pub fn count(&self) -> usize {
        self.spec
            .entries()
            .iter()
            .map(|(_, values)| values.len())
            .product()
    }

    /// Expand into concrete variants, last path varying fastest.
    pub fn variants(&self) -> Result<Vec<Variant>, LaunchError> {
        let base = serde_json::to_value(&self.base)?;
        let total = self.count();
        let mut out = Vec::with_capacity(total);
        for i in 0..total {
            let mut tree = base.clone();
            let mut index = i;
            for (path, values) in self.spec.entries().iter().rev() {
                let j = index % values.len();
                index /= values.len();
                set_by_path(&mut tree, path, &values[j])?;
            }
            out.push(serde_json::from_value(tree)?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Path assignment
// ---------------------------------------------------------------------------

/// Replace the value at a dot-separated path in a JSON tree.
///
/// The path must name an existing field, and the new value must have the
/// same JSON kind as the one it replaces.
fn set_by_path(root: &mut Value, path: &str, value: &Value) -> Result<(), LaunchError> {
    let pointer = format!("/{}", path.replace('.', "/"));
    let entry = root
        .pointer_mut(&pointer)
        .ok_or_else(|| LaunchError::BadSweepPath {
            path: path.to_string(),
        })?;
    if kind_name(entry) != kind_name(value) {
        return Err(LaunchError::InvalidValue {
            path: path.to_string(),
            expected: kind_name(entry),
            got: kind_name(value),
        });
    }
    *entry = value.clone();
    Ok(())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
