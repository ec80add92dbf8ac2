//! Client profile and inbound validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum accepted client age.
pub const MIN_AGE: i64 = 18;

/// Maximum length (chars) of the client name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length (chars) of the sector.
pub const MAX_SECTOR_LEN: usize = 100;

/// Maximum length (chars) of the stated need.
pub const MAX_NEED_LEN: usize = 500;

/// A validated client profile submitted for recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Client name
    pub name: String,

    /// Client age
    pub age: u32,

    /// Business sector
    pub sector: String,

    /// Stated need
    pub need: String,
}

impl Profile {
    /// Create a profile without inbound validation.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        sector: impl Into<String>,
        need: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            sector: sector.into(),
            need: need.into(),
        }
    }
}

/// Raw profile as received from a caller, before validation.
///
/// Fields stay loosely typed so that a missing or mistyped value is
/// reported against its field by [`ProfileInput::validate`] rather than
/// failing deserialization as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    /// Client name
    #[serde(default)]
    pub name: Option<String>,

    /// Client age: an integer, an integral float, or a numeric string
    #[serde(default)]
    pub age: Option<serde_json::Value>,

    /// Business sector
    #[serde(default)]
    pub sector: Option<String>,

    /// Stated need
    #[serde(default)]
    pub need_description: Option<String>,
}

impl ProfileInput {
    /// Input with every field present.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        sector: impl Into<String>,
        need_description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            age: Some(age.into()),
            sector: Some(sector.into()),
            need_description: Some(need_description.into()),
        }
    }

    /// Validate the input and produce a [`Profile`].
    ///
    /// All fields are checked; every failing field is reported.
    pub fn validate(self) -> Result<Profile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = check_text(&mut errors, "name", self.name, MAX_NAME_LEN);
        let sector = check_text(&mut errors, "sector", self.sector, MAX_SECTOR_LEN);
        let need = check_text(&mut errors, "need_description", self.need_description, MAX_NEED_LEN);

        let age = match self.age {
            None | Some(serde_json::Value::Null) => {
                errors.add("age", "This field is required.");
                None
            }
            Some(raw) => match coerce_integer(&raw) {
                None => {
                    errors.add("age", "A valid integer is required.");
                    None
                }
                Some(age) if age < MIN_AGE => {
                    errors.add(
                        "age",
                        format!("Ensure this value is greater than or equal to {}.", MIN_AGE),
                    );
                    None
                }
                Some(age) => match u32::try_from(age) {
                    Ok(age) => Some(age),
                    Err(_) => {
                        errors.add("age", "Ensure this value is less than or equal to 4294967295.");
                        None
                    }
                },
            },
        };

        match (name, age, sector, need) {
            (Some(name), Some(age), Some(sector), Some(need)) if errors.is_empty() => Ok(Profile {
                name,
                age,
                sector,
                need,
            }),
            _ => Err(errors),
        }
    }
}

/// Read an integer from a JSON number or a numeric string.
///
/// Floats and strings are accepted only when they hold a whole number
/// (`45`, `45.0`, `"45"`, `" 45.0 "`).
fn coerce_integer(raw: &serde_json::Value) -> Option<i64> {
    match raw {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

fn whole(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn check_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, "This field is required.");
        return None;
    };

    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field may not be blank.");
        None
    } else if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
        None
    } else {
        Some(value.to_string())
    }
}

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
#[error("invalid profile ({} field(s) rejected)", .fields.len())]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Record a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for one field.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// All failing fields with their messages.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> ProfileInput {
        ProfileInput::new("Claire Dubois", 45, "Finance", "analyse de données de marché")
    }

    #[test]
    fn test_valid_input_produces_profile() {
        let profile = valid_input().validate().unwrap();
        assert_eq!(profile.age, 45);
        assert_eq!(profile.sector, "Finance");
        assert_eq!(profile.need, "analyse de données de marché");
    }

    #[test]
    fn test_underage_rejected() {
        let input = ProfileInput { age: Some(json!(17)), ..valid_input() };
        let errors = input.validate().unwrap_err();
        assert!(errors.field("age").is_some());
        assert!(errors.field("name").is_none());
    }

    #[test]
    fn test_minimum_age_accepted() {
        let input = ProfileInput { age: Some(json!(MIN_AGE)), ..valid_input() };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_negative_age_rejected() {
        let input = ProfileInput { age: Some(json!(-3)), ..valid_input() };
        assert!(input.validate().unwrap_err().field("age").is_some());
    }

    #[test]
    fn test_age_coerced_from_string_and_whole_float() {
        for raw in [json!("45"), json!(" 45 "), json!(45.0), json!("45.0")] {
            let input = ProfileInput { age: Some(raw.clone()), ..valid_input() };
            assert_eq!(input.validate().unwrap().age, 45, "age {}", raw);
        }
    }

    #[test]
    fn test_non_integer_age_reported_on_field() {
        for raw in [json!("quarante"), json!(45.5), json!(true), json!([45])] {
            let input = ProfileInput { age: Some(raw.clone()), ..valid_input() };
            let errors = input.validate().unwrap_err();
            assert_eq!(
                errors.field("age"),
                Some(&["A valid integer is required.".to_string()][..]),
                "age {}",
                raw
            );
        }
    }

    #[test]
    fn test_need_length_limit_counts_chars() {
        // 'é' is two bytes but one char
        let at_limit = ProfileInput { need_description: Some("é".repeat(MAX_NEED_LEN)), ..valid_input() };
        assert!(at_limit.validate().is_ok());

        let over = ProfileInput { need_description: Some("é".repeat(MAX_NEED_LEN + 1)), ..valid_input() };
        assert!(over.validate().unwrap_err().field("need_description").is_some());
    }

    #[test]
    fn test_missing_fields_are_required() {
        let errors = ProfileInput::default().validate().unwrap_err();
        assert_eq!(errors.fields().len(), 4);
        for field in ["name", "age", "sector", "need_description"] {
            assert_eq!(
                errors.field(field),
                Some(&["This field is required.".to_string()][..]),
                "{}",
                field
            );
        }
    }

    #[test]
    fn test_blank_and_missing_are_distinguished() {
        let input = ProfileInput { sector: Some("  ".to_string()), name: None, ..valid_input() };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field("sector"), Some(&["This field may not be blank.".to_string()][..]));
        assert_eq!(errors.field("name"), Some(&["This field is required.".to_string()][..]));
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let input = ProfileInput { sector: Some("  ".to_string()), ..valid_input() };
        let errors = input.validate().unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert!(json["sector"].is_array());
    }

    #[test]
    fn test_mistyped_body_still_deserializes() {
        let input: ProfileInput = serde_json::from_value(json!({
            "name": "Claire",
            "age": "quarante",
            "sector": "Finance",
            "need_description": "analyse",
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().field("age").is_some());
    }
}
