//! Field-level validation shared by the typed form structs.
//!
//! A form's `validate()` returns either its validated payload or a
//! [`FieldErrors`] map that the template renders next to each input.

use std::collections::BTreeMap;

use serde::Serialize;

pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_ERROR: &str = "The CSRF token is missing or invalid.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn csrf() -> Self {
        let mut errors = Self::new();
        errors.add(CSRF_FIELD, CSRF_ERROR);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Records `message` if `value` is empty. Returns whether the value was present.
pub fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> bool {
    if value.is_empty() {
        errors.add(field, message);
        return false;
    }
    true
}

/// Length is counted in characters, not bytes.
pub fn max_chars(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max: usize,
    message: &str,
) {
    if value.chars().count() > max {
        errors.add(field, message);
    }
}
