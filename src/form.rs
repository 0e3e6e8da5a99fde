//! Field store shared by every wizard step.
//!
//! Holds the customer draft plus the per-field validation messages shown next
//! to each input. Editing a field clears its message; messages are only
//! produced by [`FieldStore::validate`].

use crate::errors::AppError;
use crate::models::{CustomerDraft, CustomerField, FieldError};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    draft: CustomerDraft,
    errors: BTreeMap<CustomerField, String>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &CustomerDraft {
        &self.draft
    }

    pub fn value(&self, field: CustomerField) -> &str {
        self.draft.get(field)
    }

    pub fn set(&mut self, field: CustomerField, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.remove(&field);
    }

    pub fn error(&self, field: CustomerField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .map(|(field, message)| FieldError {
                field: *field,
                message: message.clone(),
            })
            .collect()
    }

    /// Validates `fields`, recording a message for each failing one.
    ///
    /// Returns `AppError::Validation` with the failing field names in the order given.
    pub fn validate(&mut self, fields: &[CustomerField]) -> Result<(), AppError> {
        let mut failing = Vec::new();

        for field in fields {
            match check_field(&self.draft, *field) {
                Some(message) => {
                    self.errors.insert(*field, message);
                    failing.push(field.as_str().to_string());
                }
                None => {
                    self.errors.remove(field);
                }
            }
        }

        if failing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(failing))
        }
    }

    pub fn validate_required(&mut self) -> Result<(), AppError> {
        self.validate(&CustomerField::REQUIRED)
    }
}

fn check_field(draft: &CustomerDraft, field: CustomerField) -> Option<String> {
    let value = draft.get(field);
    if value.trim().is_empty() {
        return Some(format!("{} is required.", field.label()));
    }

    if field == CustomerField::DateOfBirth && draft.birth_date().is_none() {
        return Some("Date of Birth must be a valid date (YYYY-MM-DD).".to_string());
    }

    None
}
