//! Positional argument decoding.
//!
//! Multi-argument methods take a JSON array. Single-argument methods take a
//! bare scalar or a one-element array. Shape mismatches are reported as
//! `InvalidArguments`.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{BridgeFailure, Result};

/// Arguments of one call, tagged with the method for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    method: &'a str,
    value: &'a Value,
}

impl<'a> Args<'a> {
    pub fn new(method: &'a str, value: &'a Value) -> Self {
        Self { method, value }
    }

    fn invalid(&self, what: impl std::fmt::Display) -> BridgeFailure {
        BridgeFailure::invalid_arguments(format!("{}: {}", self.method, what))
    }

    /// Positional array of at least `len` entries.
    pub fn positional(&self, len: usize) -> Result<Positional<'a>> {
        let values = self
            .value
            .as_array()
            .ok_or_else(|| self.invalid(format!("expected an array of {} arguments", len)))?;

        if values.len() < len {
            return Err(self.invalid(format!(
                "expected {} arguments, got {}",
                len,
                values.len()
            )));
        }

        Ok(Positional {
            method: self.method,
            values,
        })
    }

    /// A single string argument.
    pub fn single_string(&self) -> Result<&'a str> {
        let value = match self.value {
            Value::Array(values) if values.len() == 1 => &values[0],
            other => other,
        };

        value
            .as_str()
            .ok_or_else(|| self.invalid("expected a single string argument"))
    }

    /// `null` or a list of strings.
    pub fn optional_string_list(&self) -> Result<Option<Vec<&'a str>>> {
        match self.value {
            Value::Null => Ok(None),
            Value::Array(values) => string_list(values)
                .map(Some)
                .ok_or_else(|| self.invalid("expected a list of strings")),
            _ => Err(self.invalid("expected a list of strings or null")),
        }
    }
}

fn string_list(values: &[Value]) -> Option<Vec<&str>> {
    values.iter().map(Value::as_str).collect()
}

/// Positional arguments of a multi-argument call.
#[derive(Debug, Clone, Copy)]
pub struct Positional<'a> {
    method: &'a str,
    values: &'a [Value],
}

impl<'a> Positional<'a> {
    fn invalid(&self, index: usize, name: &str, expected: &str) -> BridgeFailure {
        BridgeFailure::invalid_arguments(format!(
            "{}: argument {} ({}) must be {}",
            self.method, index, name, expected
        ))
    }

    pub fn string(&self, index: usize, name: &str) -> Result<&'a str> {
        self.values[index]
            .as_str()
            .ok_or_else(|| self.invalid(index, name, "a string"))
    }

    pub fn bool(&self, index: usize, name: &str) -> Result<bool> {
        self.values[index]
            .as_bool()
            .ok_or_else(|| self.invalid(index, name, "a boolean"))
    }

    pub fn i64(&self, index: usize, name: &str) -> Result<i64> {
        self.values[index]
            .as_i64()
            .ok_or_else(|| self.invalid(index, name, "an integer"))
    }

    pub fn u32(&self, index: usize, name: &str) -> Result<u32> {
        self.values[index]
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| self.invalid(index, name, "a non-negative 32-bit integer"))
    }

    /// Any JSON number, integers included.
    pub fn f64(&self, index: usize, name: &str) -> Result<f64> {
        self.values[index]
            .as_f64()
            .ok_or_else(|| self.invalid(index, name, "a number"))
    }

    pub fn string_list(&self, index: usize, name: &str) -> Result<Vec<&'a str>> {
        self.values[index]
            .as_array()
            .and_then(|values| string_list(values))
            .ok_or_else(|| self.invalid(index, name, "a list of strings"))
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_seconds(&self, index: usize, name: &str) -> Result<DateTime<Utc>> {
        let seconds = self.i64(index, name)?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| self.invalid(index, name, "a representable timestamp"))
    }
}
