//! Name-keyed slash command arguments
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use serde_json::Value;
use std::collections::HashMap;

/// Option values of one interaction, keyed by the callback's parameter names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter: impl Into<String>, value: Value) {
        self.values.insert(parameter.into(), value);
    }

    pub fn get(&self, parameter: &str) -> Option<&Value> {
        self.values.get(parameter)
    }

    pub fn get_str(&self, parameter: &str) -> Option<&str> {
        self.get(parameter).and_then(Value::as_str)
    }

    pub fn get_i64(&self, parameter: &str) -> Option<i64> {
        self.get(parameter).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, parameter: &str) -> Option<f64> {
        self.get(parameter).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, parameter: &str) -> Option<bool> {
        self.get(parameter).and_then(Value::as_bool)
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.values.contains_key(parameter)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.values
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
