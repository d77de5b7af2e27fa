//! Input model: current field values and their validation state.
//!
//! Edits are parsed by the field's own validator. A rejected edit records
//! the raw text and the error but keeps the last accepted value, so the
//! user never loses data to a typo.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::property::{EstimateRequest, PropertyField, ValidationError};

/// Result of a single field edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted { value: f64 },
    Rejected(ValidationError),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }
}

/// State of one form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldState {
    /// Last text the user entered
    pub raw: String,
    /// Last accepted value
    pub value: Option<f64>,
    /// Error from the most recent edit, cleared by the next accepted one
    pub error: Option<ValidationError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputModel {
    fields: BTreeMap<PropertyField, FieldState>,
}

impl InputModel {
    /// Every field unset.
    pub fn empty() -> Self {
        Self {
            fields: PropertyField::ALL
                .into_iter()
                .map(|field| (field, FieldState::default()))
                .collect(),
        }
    }

    /// Pre-filled from an existing request.
    pub fn from_request(request: &EstimateRequest) -> Self {
        Self {
            fields: PropertyField::ALL
                .into_iter()
                .map(|field| {
                    let value = request.get(field);
                    let state = match field.check(value) {
                        Ok(value) => FieldState {
                            raw: value.to_string(),
                            value: Some(value),
                            error: None,
                        },
                        Err(error) => FieldState {
                            raw: value.to_string(),
                            value: None,
                            error: Some(error),
                        },
                    };
                    (field, state)
                })
                .collect(),
        }
    }

    /// Apply a user edit to one field.
    pub fn update(&mut self, field: PropertyField, raw: &str) -> ValidationOutcome {
        let state = self.fields.entry(field).or_default();
        state.raw = raw.to_string();

        match field.parse(raw) {
            Ok(value) => {
                state.value = Some(value);
                state.error = None;
                ValidationOutcome::Accepted { value }
            }
            Err(error) => {
                tracing::debug!(field = field.name(), error = %error, "Rejected field edit");
                state.error = Some(error.clone());
                ValidationOutcome::Rejected(error)
            }
        }
    }

    pub fn field(&self, field: PropertyField) -> Option<&FieldState> {
        self.fields.get(&field)
    }

    pub fn value(&self, field: PropertyField) -> Option<f64> {
        self.fields.get(&field).and_then(|state| state.value)
    }

    pub fn error(&self, field: PropertyField) -> Option<&ValidationError> {
        self.fields.get(&field).and_then(|state| state.error.as_ref())
    }

    /// Iterate fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyField, &FieldState)> {
        self.fields.iter().map(|(field, state)| (*field, state))
    }

    /// True iff every field holds an accepted value and no edit is pending correction.
    pub fn is_submittable(&self) -> bool {
        PropertyField::ALL.into_iter().all(|field| {
            self.fields
                .get(&field)
                .is_some_and(|state| state.value.is_some() && state.error.is_none())
        })
    }

    /// Build the request to submit, or the first error blocking submission.
    pub fn to_request(&self) -> Result<EstimateRequest, ValidationError> {
        if let Some(error) = PropertyField::ALL
            .into_iter()
            .find_map(|field| self.error(field).cloned())
        {
            return Err(error);
        }
        EstimateRequest::from_fields(|field| self.value(field))
    }
}

impl Default for InputModel {
    fn default() -> Self {
        Self::from_request(&EstimateRequest::default())
    }
}
