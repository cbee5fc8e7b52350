//! Additional training arguments forwarded to the trainer and interactive session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys consumed while loading training data rather than while fitting policies.
pub const DATA_LOAD_KEYS: &[&str] = &[
    "use_story_concatenation",
    "unique_last_num_states",
    "augmentation_factor",
    "remove_duplicates",
    "debug_plots",
];

/// Named extra arguments. Keys without a value are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraArgs(BTreeMap<String, Value>);

impl ExtraArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the CLI's optional training flags.
    pub fn from_cli(augmentation_factor: Option<u32>, debug_plots: Option<bool>) -> Self {
        let mut args = Self::new();
        args.set_opt("augmentation_factor", augmentation_factor.map(Value::from));
        args.set_opt("debug_plots", debug_plots.map(Value::from));
        args
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        if !value.is_null() {
            self.0.insert(key.into(), value);
        }
    }

    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<Value>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into (data loading args, training args).
    pub fn split_data_load_args(&self) -> (ExtraArgs, ExtraArgs) {
        let mut data = ExtraArgs::new();
        let mut train = ExtraArgs::new();
        for (key, value) in &self.0 {
            if DATA_LOAD_KEYS.contains(&key.as_str()) {
                data.0.insert(key.clone(), value.clone());
            } else {
                train.0.insert(key.clone(), value.clone());
            }
        }
        (data, train)
    }
}
