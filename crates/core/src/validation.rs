//! Field-level validation shared by the service handlers and the client
//! workflows.
//!
//! Client workflows run these before issuing a request, so an invalid form
//! never reaches the network.

use crate::error::CoreError;

/// Maximum length of a short name field (beat label, scene title).
pub const MAX_NAME_LEN: usize = 200;

/// Validate that a required text field is not empty after trimming.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Validate a short name: non-empty and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    validate_required(field, value)?;
    let len = value.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate an identifier key: non-empty, lowercase ASCII letters, digits
/// and underscores only.
pub fn validate_key(field: &str, value: &str) -> Result<(), CoreError> {
    validate_name(field, value)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "{field} may only contain a-z, 0-9 and '_', got '{value}'"
        )));
    }
    Ok(())
}

/// Validate that a 1-based ordinal (scene number, shot number) is positive.
pub fn validate_ordinal(field: &str, value: i32) -> Result<(), CoreError> {
    if value < 1 {
        return Err(CoreError::Validation(format!(
            "{field} must be >= 1, got {value}"
        )));
    }
    Ok(())
}

/// Validate a duration in seconds: finite and non-negative.
pub fn validate_duration_secs(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_nan() || value.is_infinite() {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("synopsis", "").is_err());
        assert!(validate_required("synopsis", "   \n").is_err());
    }

    #[test]
    fn key_accepts_snake_case() {
        assert!(validate_key("key", "call_to_adventure").is_ok());
        assert!(validate_key("key", "beat_12").is_ok());
    }

    #[test]
    fn key_rejects_path_characters() {
        assert!(validate_key("key", "act 1").is_err());
        assert!(validate_key("key", "a/b").is_err());
        assert!(validate_key("key", "Setup").is_err());
        assert!(validate_key("key", "").is_err());
    }

    #[test]
    fn required_accepts_text() {
        assert!(validate_required("synopsis", "A heist goes wrong").is_ok());
    }

    #[test]
    fn name_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name("title", &long).is_err());
    }

    #[test]
    fn name_counts_chars_not_bytes() {
        let accented = "é".repeat(MAX_NAME_LEN);
        assert!(validate_name("title", &accented).is_ok());
    }

    #[test]
    fn ordinal_must_be_positive() {
        assert!(validate_ordinal("scene_number", 1).is_ok());
        assert!(validate_ordinal("scene_number", 0).is_err());
        assert!(validate_ordinal("scene_number", -3).is_err());
    }

    #[test]
    fn duration_rejects_nan_and_negative() {
        assert!(validate_duration_secs("duration_seconds", 4.5).is_ok());
        assert!(validate_duration_secs("duration_seconds", 0.0).is_ok());
        assert!(validate_duration_secs("duration_seconds", -1.0).is_err());
        assert!(validate_duration_secs("duration_seconds", f64::NAN).is_err());
        assert!(validate_duration_secs("duration_seconds", f64::INFINITY).is_err());
    }
}
