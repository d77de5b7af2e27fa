//! Property attributes submitted to the valuation service.
//!
//! Each [`PropertyField`] owns its validator, so the input model and the
//! request type agree on what a valid value is.

use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest construction year accepted for `year_built`.
pub const EARLIEST_YEAR_BUILT: i32 = 1800;

/// The attributes collected from the user, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyField {
    SquareFootage,
    Bedrooms,
    Bathrooms,
    YearBuilt,
    LotSize,
    DistanceToCityCenter,
    SchoolRating,
}

impl PropertyField {
    /// Every field, in display order.
    pub const ALL: [PropertyField; 7] = [
        PropertyField::SquareFootage,
        PropertyField::Bedrooms,
        PropertyField::Bathrooms,
        PropertyField::YearBuilt,
        PropertyField::LotSize,
        PropertyField::DistanceToCityCenter,
        PropertyField::SchoolRating,
    ];

    /// Wire name, matching the valuation service's JSON keys.
    pub fn name(self) -> &'static str {
        match self {
            PropertyField::SquareFootage => "square_footage",
            PropertyField::Bedrooms => "bedrooms",
            PropertyField::Bathrooms => "bathrooms",
            PropertyField::YearBuilt => "year_built",
            PropertyField::LotSize => "lot_size",
            PropertyField::DistanceToCityCenter => "distance_to_city_center",
            PropertyField::SchoolRating => "school_rating",
        }
    }

    /// Human-readable label for forms and messages.
    pub fn label(self) -> &'static str {
        match self {
            PropertyField::SquareFootage => "Square Footage",
            PropertyField::Bedrooms => "Bedrooms",
            PropertyField::Bathrooms => "Bathrooms",
            PropertyField::YearBuilt => "Year Built",
            PropertyField::LotSize => "Lot Size (sq ft)",
            PropertyField::DistanceToCityCenter => "Distance to City Center (miles)",
            PropertyField::SchoolRating => "School Rating (0-10)",
        }
    }

    /// Look a field up by its wire name.
    pub fn from_name(name: &str) -> Option<PropertyField> {
        PropertyField::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Parse raw user input into this field's semantic value.
    pub fn parse(self, raw: &str) -> Result<f64, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Missing { field: self });
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::NotANumber { field: self })?;
        self.check(value)
    }

    /// Check an already-numeric value against this field's constraints.
    pub fn check(self, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotANumber { field: self });
        }

        let out_of_range = |bound: String| ValidationError::OutOfRange { field: self, bound };

        match self {
            PropertyField::SquareFootage | PropertyField::LotSize => {
                if value <= 0.0 {
                    return Err(out_of_range("greater than 0".to_string()));
                }
            }
            PropertyField::Bedrooms => {
                if value.fract() != 0.0 {
                    return Err(ValidationError::NotAWholeNumber { field: self });
                }
                if !(0.0..=f64::from(u32::MAX)).contains(&value) {
                    return Err(out_of_range("0 or more".to_string()));
                }
            }
            PropertyField::Bathrooms => {
                if value < 0.0 {
                    return Err(out_of_range("0 or more".to_string()));
                }
                if (value * 2.0).fract() != 0.0 {
                    return Err(ValidationError::NotAHalfIncrement { field: self });
                }
            }
            PropertyField::YearBuilt => {
                if value.fract() != 0.0 {
                    return Err(ValidationError::NotAWholeNumber { field: self });
                }
                let latest = latest_year_built();
                if value < f64::from(EARLIEST_YEAR_BUILT) || value > f64::from(latest) {
                    return Err(out_of_range(format!(
                        "between {} and {}",
                        EARLIEST_YEAR_BUILT, latest
                    )));
                }
            }
            PropertyField::DistanceToCityCenter => {
                if value < 0.0 {
                    return Err(out_of_range("0 or more".to_string()));
                }
            }
            PropertyField::SchoolRating => {
                if !(0.0..=10.0).contains(&value) {
                    return Err(out_of_range("between 0 and 10".to_string()));
                }
            }
        }

        Ok(value)
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Latest accepted construction year (the current calendar year).
pub fn latest_year_built() -> i32 {
    chrono::Utc::now().year()
}

/// A field-scoped validation failure. Blocks submission until corrected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: PropertyField },

    #[error("{field} must be a number")]
    NotANumber { field: PropertyField },

    #[error("{field} must be a whole number")]
    NotAWholeNumber { field: PropertyField },

    #[error("{field} must be in increments of 0.5")]
    NotAHalfIncrement { field: PropertyField },

    #[error("{field} must be {bound}")]
    OutOfRange { field: PropertyField, bound: String },
}

impl ValidationError {
    /// The field this error belongs to.
    pub fn field(&self) -> PropertyField {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field }
            | ValidationError::NotAWholeNumber { field }
            | ValidationError::NotAHalfIncrement { field }
            | ValidationError::OutOfRange { field, .. } => *field,
        }
    }
}

/// A complete, well-formed valuation request.
///
/// Serializes to the exact JSON body the valuation service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub square_footage: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub year_built: i32,
    pub lot_size: f64,
    pub distance_to_city_center: f64,
    pub school_rating: f64,
}

impl EstimateRequest {
    /// Numeric value of a single field.
    pub fn get(&self, field: PropertyField) -> f64 {
        match field {
            PropertyField::SquareFootage => self.square_footage,
            PropertyField::Bedrooms => f64::from(self.bedrooms),
            PropertyField::Bathrooms => self.bathrooms,
            PropertyField::YearBuilt => f64::from(self.year_built),
            PropertyField::LotSize => self.lot_size,
            PropertyField::DistanceToCityCenter => self.distance_to_city_center,
            PropertyField::SchoolRating => self.school_rating,
        }
    }

    /// Run every field validator, reporting the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in PropertyField::ALL {
            field.check(self.get(field))?;
        }
        Ok(())
    }

    /// Build a request from per-field values, validating each one.
    ///
    /// `value_of` returns `None` for fields that have no value yet.
    pub fn from_fields<F>(mut value_of: F) -> Result<Self, ValidationError>
    where
        F: FnMut(PropertyField) -> Option<f64>,
    {
        let mut take = |field: PropertyField| -> Result<f64, ValidationError> {
            let value = value_of(field).ok_or(ValidationError::Missing { field })?;
            field.check(value)
        };

        Ok(EstimateRequest {
            square_footage: take(PropertyField::SquareFootage)?,
            bedrooms: take(PropertyField::Bedrooms)? as u32,
            bathrooms: take(PropertyField::Bathrooms)?,
            year_built: take(PropertyField::YearBuilt)? as i32,
            lot_size: take(PropertyField::LotSize)?,
            distance_to_city_center: take(PropertyField::DistanceToCityCenter)?,
            school_rating: take(PropertyField::SchoolRating)?,
        })
    }
}

impl Default for EstimateRequest {
    /// The pre-filled form values shown on first load.
    fn default() -> Self {
        EstimateRequest {
            square_footage: 1500.0,
            bedrooms: 3,
            bathrooms: 2.0,
            year_built: 2000,
            lot_size: 5000.0,
            distance_to_city_center: 5.0,
            school_rating: 7.0,
        }
    }
}
