// 📐 Field Validation
// Turns raw text from the form into typed values and collects per-field errors

use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const REQUIRED_MESSAGE: &str = "Field can't be empty";
pub const NOT_AN_EMAIL_MESSAGE: &str = "Not an email address";
pub const INVALID_DATE_MESSAGE: &str = "Invalid date";
pub const INVALID_NUMBER_MESSAGE: &str = "Invalid number";

/// Date layouts accepted in date fields, tried in order
pub const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

// ============================================================================
// PARSE POLICY
// ============================================================================

/// What to do with a non-blank date or number that does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Report the field as invalid
    #[default]
    Strict,
    /// Store an absent value and move on
    Permissive,
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// Field name -> message, filled during one validation pass.
///
/// Only the first message for a field is kept, so checks must run in the
/// order their messages should win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Ok(value) when no error was recorded, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// FIELD HELPERS
// ============================================================================

/// Records a required-field error when `text` is blank. Returns true if present.
pub fn require_text(errors: &mut ValidationErrors, field: &str, text: &str) -> bool {
    if text.trim().is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
        false
    } else {
        true
    }
}

pub fn try_parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Accepts `,` as decimal separator. Rejects NaN and infinities.
pub fn try_parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn try_parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Parses an optional field.
///
/// Blank text is an absent value. Text that fails to parse is an error under
/// `ParsePolicy::Strict` and an absent value under `ParsePolicy::Permissive`.
pub fn parse_optional<T, F>(
    errors: &mut ValidationErrors,
    field: &str,
    text: &str,
    policy: ParsePolicy,
    parse: F,
    message: &str,
) -> Option<T>
where
    F: Fn(&str) -> Option<T>,
{
    if text.trim().is_empty() {
        return None;
    }

    let parsed = parse(text);
    if parsed.is_none() && policy == ParsePolicy::Strict {
        errors.add(field, message);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("email", REQUIRED_MESSAGE);
        errors.add("email", NOT_AN_EMAIL_MESSAGE);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_require_text_blank_inputs() {
        for input in ["", " ", "\t", "  \n "] {
            let mut errors = ValidationErrors::new();
            assert!(!require_text(&mut errors, "name", input));
            assert!(errors.contains("name"));
        }

        let mut errors = ValidationErrors::new();
        assert!(require_text(&mut errors, "name", " Alice "));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(try_parse_int("42"), Some(42));
        assert_eq!(try_parse_int(" 7 "), Some(7));
        assert_eq!(try_parse_int(""), None);
        assert_eq!(try_parse_int("4x"), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(try_parse_decimal("1000.0"), Some(1000.0));
        assert_eq!(try_parse_decimal("2500,75"), Some(2500.75));
        assert_eq!(try_parse_decimal("abc"), None);
        assert_eq!(try_parse_decimal("NaN"), None);
        assert_eq!(try_parse_decimal("inf"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2000, 1, 1);
        assert_eq!(try_parse_date("01/01/2000"), expected);
        assert_eq!(try_parse_date("01-01-2000"), expected);
        assert_eq!(try_parse_date("2000-01-01"), expected);
        assert_eq!(try_parse_date("2000/13/01"), None);
        assert_eq!(try_parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_optional_policies() {
        let mut errors = ValidationErrors::new();
        let blank: Option<f64> = parse_optional(
            &mut errors,
            "base_salary",
            "  ",
            ParsePolicy::Strict,
            try_parse_decimal,
            INVALID_NUMBER_MESSAGE,
        );
        assert_eq!(blank, None);
        assert!(errors.is_empty());

        let strict: Option<f64> = parse_optional(
            &mut errors,
            "base_salary",
            "ten",
            ParsePolicy::Strict,
            try_parse_decimal,
            INVALID_NUMBER_MESSAGE,
        );
        assert_eq!(strict, None);
        assert_eq!(errors.get("base_salary"), Some(INVALID_NUMBER_MESSAGE));

        let mut errors = ValidationErrors::new();
        let permissive: Option<f64> = parse_optional(
            &mut errors,
            "base_salary",
            "ten",
            ParsePolicy::Permissive,
            try_parse_decimal,
            INVALID_NUMBER_MESSAGE,
        );
        assert_eq!(permissive, None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));

        let mut errors = ValidationErrors::new();
        errors.add("name", REQUIRED_MESSAGE);
        let err = errors.into_result(5).unwrap_err();
        assert_eq!(err.to_string(), "name: Field can't be empty");
    }
}
