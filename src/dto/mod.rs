//! Request and response bodies.
//!
//! Request bodies arrive as raw JSON and are read through [`FieldReader`], so
//! presence and type problems are reported per field before any domain code
//! runs. Range and length rules then go through `validator`.

pub mod alerts;
pub mod inventory;
pub mod products;

use crate::errors::ServiceError;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use validator::ValidationErrors;

/// Typed access to the fields of a JSON object body
#[derive(Debug)]
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(payload: &'a Value) -> Result<Self, ServiceError> {
        payload
            .as_object()
            .map(|object| Self { object })
            .ok_or_else(|| ServiceError::ValidationError("request body must be a JSON object".to_string()))
    }

    /// Fails with every absent (or null) field listed at once
    pub fn require(&self, fields: &[&str]) -> Result<(), ServiceError> {
        let missing: Vec<String> = fields
            .iter()
            .filter(|field| self.value(field).is_none())
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::MissingFields(missing))
        }
    }

    fn value(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn missing(field: &str) -> ServiceError {
        ServiceError::MissingFields(vec![field.to_string()])
    }

    /// Trimmed string value
    pub fn string(&self, field: &str) -> Result<String, ServiceError> {
        self.optional_string(field)?.ok_or_else(|| Self::missing(field))
    }

    pub fn optional_string(&self, field: &str) -> Result<Option<String>, ServiceError> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(_) => Err(ServiceError::invalid_field(field, "a string")),
        }
    }

    /// Integer given as a JSON number or a numeric string
    pub fn integer<T>(&self, field: &str, expected: &str) -> Result<T, ServiceError>
    where
        T: TryFrom<i64>,
    {
        self.optional_integer(field, expected)?
            .ok_or_else(|| Self::missing(field))
    }

    pub fn optional_integer<T>(&self, field: &str, expected: &str) -> Result<Option<T>, ServiceError>
    where
        T: TryFrom<i64>,
    {
        let Some(value) = self.value(field) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        parsed
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ServiceError::invalid_field(field, expected))
    }

    /// Decimal given as a JSON number or a numeric string
    pub fn decimal(&self, field: &str, expected: &str) -> Result<Decimal, ServiceError> {
        let value = self.value(field).ok_or_else(|| Self::missing(field))?;

        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return Err(ServiceError::invalid_field(field, expected)),
        };

        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| ServiceError::invalid_field(field, expected))
    }
}

/// Turns `validator` output into an error naming the first offending field.
///
/// Fields are taken in name order so the reported field is stable.
pub fn invalid_field_from(errors: &ValidationErrors, expected: impl Fn(&str) -> &'static str) -> ServiceError {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();

    match fields.first() {
        Some(field) => ServiceError::invalid_field(*field, expected(*field)),
        None => ServiceError::ValidationError(errors.to_string()),
    }
}
