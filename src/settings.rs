//! Key-value effect settings.
//!
//! The host hands each effect a flat key-value store at start time. Effects
//! read their knobs once inside `start()` and convert them into a plain
//! config struct; nothing reads settings after startup and there is no
//! process-wide settings state.
//!
//! # Example
//!
//! ```
//! use plume::settings::Settings;
//!
//! let settings = Settings::new()
//!     .with("particle_count", 4096)
//!     .with("lifetime", 2.5)
//!     .with("emitting", true);
//!
//! assert_eq!(settings.int("particle_count", 1024), 4096);
//! assert_eq!(settings.float("lifetime", 2.0), 2.5);
//! assert_eq!(settings.float("missing", 2.0), 2.0);
//! ```

use std::collections::HashMap;

/// A single setting value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f32),
    Flag(bool),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Flag(v)
    }
}

/// Flat key-value settings store with typed, defaulted getters.
///
/// Lookups never fail: a missing key or a type mismatch yields the caller's
/// default. Numeric getters convert between int and float so a host that
/// stores `2` where the effect expects `2.0` still works.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: HashMap<String, Value>,
}

impl Settings {
    /// Create an empty store (every getter returns its default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, builder-style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Insert a value in place.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Float setting, falling back to `default` when absent.
    pub fn float(&self, key: &str, default: f32) -> f32 {
        match self.values.get(key) {
            Some(Value::Float(v)) => *v,
            Some(Value::Int(v)) => *v as f32,
            _ => default,
        }
    }

    /// Integer setting, falling back to `default` when absent.
    pub fn int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(Value::Int(v)) => *v,
            Some(Value::Float(v)) => *v as i64,
            _ => default,
        }
    }

    /// Boolean setting, falling back to `default` when absent.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Flag(v)) => *v,
            _ => default,
        }
    }

    /// Whether a key is present at all.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
