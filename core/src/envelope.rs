//! The uniform result envelope returned by every dispatched call.
//!
//! # Design
//! `success` is not stored; it is derived from the error list so the two can
//! never disagree. The payload is only reachable through accessors that
//! check `success()` first.
//!
//! Servers differ in how they case JSON keys, so decoding is lenient: the
//! envelope's own `data`/`errors` keys match in any case, and struct fields
//! inside the payload match their keys ignoring ASCII case.

use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Map, Value};

use crate::lenient;

/// Payload type of calls whose data the caller does not read.
pub type Untyped = IgnoredAny;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T = Untyped> {
    errors: Vec<String>,
    data: Option<T>,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    /// An empty, successful envelope with no payload.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: T) -> Self {
        Self {
            errors: Vec::new(),
            data: Some(data),
        }
    }

    /// A failed envelope carrying one `"{status} - {message}"` entry.
    pub fn failure(status: &str, message: &str) -> Self {
        let mut response = Self::new();
        response.add_error(status, message);
        response
    }

    /// A failed envelope carrying one `"Unhandled - {fault}"` entry.
    pub fn fault(fault: &dyn fmt::Display) -> Self {
        let mut response = Self::new();
        response.add_fault(fault);
        response
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn data(&self) -> Option<&T> {
        if self.success() {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn into_data(self) -> Option<T> {
        if self.success() {
            self.data
        } else {
            None
        }
    }

    /// Append one entry verbatim. Duplicates are kept.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_error(&mut self, status: &str, message: &str) {
        self.push_error(format!("{status} - {message}"));
    }

    pub fn add_fault(&mut self, fault: &dyn fmt::Display) {
        self.add_error("Unhandled", &fault.to_string());
    }

    /// Every entry followed by `". "`, in insertion order.
    pub fn string_errors(&self) -> String {
        self.errors.iter().map(|e| format!("{e}. ")).collect()
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode a server-produced envelope.
    ///
    /// An empty body decodes to an empty successful envelope. Any other body
    /// must be a JSON object.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::new());
        }

        let object: Map<String, Value> = serde_json::from_str(body)?;
        let mut errors = Value::Null;
        let mut data = Value::Null;
        for (key, value) in object {
            if key.eq_ignore_ascii_case("errors") {
                errors = value;
            } else if key.eq_ignore_ascii_case("data") {
                data = value;
            }
        }

        let errors = match errors {
            Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };
        let data = match data {
            Value::Null => None,
            other => Some(lenient::from_value(other)?),
        };
        Ok(Self { errors, data })
    }
}
