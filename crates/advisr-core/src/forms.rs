//! Add-location and add-category form validation.
//!
//! Raw form fields are strings exactly as typed. Validation produces the
//! payload sent to the backend, or field-scoped errors that block submission.

use serde::Serialize;
use thiserror::Error;

use crate::geo::LatLng;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One or more field errors; submission must not proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// `true` if any error is scoped to `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Payload for `POST /locations/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub keywords: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Payload for `POST /categories/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationForm {
    pub name: String,
    pub category_id: String,
    pub latitude: String,
    pub longitude: String,
    pub keywords: String,
}

impl LocationForm {
    /// Fill the coordinate fields from a map point (map centre or click).
    pub fn set_coordinates(&mut self, point: LatLng) {
        let (lat, lng) = point.to_fixed6();
        self.latitude = lat;
        self.longitude = lng;
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every offending field.
    pub fn validate(&self) -> Result<NewLocation, ValidationError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "name is required"));
        }

        let latitude = parse_coordinate(&self.latitude, "latitude", 90.0, &mut errors);
        let longitude = parse_coordinate(&self.longitude, "longitude", 180.0, &mut errors);

        let category_id = match self.category_id.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(FieldError::new("category_id", "invalid category"));
                    None
                }
            },
        };

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if errors.is_empty() => Ok(NewLocation {
                name: name.to_owned(),
                latitude,
                longitude,
                keywords: self.keywords.trim().to_owned(),
                status: "active",
                category_id,
            }),
            _ => Err(ValidationError { errors }),
        }
    }
}

fn parse_coordinate(
    raw: &str,
    field: &'static str,
    limit: f64,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
        return None;
    }
    let Ok(value) = raw.parse::<f64>() else {
        errors.push(FieldError::new(field, "invalid coordinates"));
        return None;
    };
    if !value.is_finite() || value < -limit || value > limit {
        errors.push(FieldError::new(field, "coordinates out of range"));
        return None;
    }
    Some(value)
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub icon: String,
}

impl CategoryForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name is blank.
    pub fn validate(&self) -> Result<NewCategory, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError {
                errors: vec![FieldError::new("name", "category name is required")],
            });
        }
        Ok(NewCategory {
            name: name.to_owned(),
            icon: self.icon.trim().to_owned(),
        })
    }
}
