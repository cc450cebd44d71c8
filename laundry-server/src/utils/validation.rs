//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use shared::models::Address;

use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: service, customer full name, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, special instructions, refund reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, payment reference, area names
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Street lines and landmarks
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a Lagos address: street/area present and LGA one of the 20 Lagos LGAs.
///
/// Returns the address with its LGA normalized to the canonical spelling.
pub fn validate_address(address: &Address, field: &str) -> Result<Address, AppError> {
    let invalid = |msg: String| AppError::with_message(ErrorCode::InvalidAddress, msg);

    if address.street.trim().is_empty() {
        return Err(invalid(format!("{field}: street must not be empty")));
    }
    if address.area.trim().is_empty() {
        return Err(invalid(format!("{field}: area must not be empty")));
    }
    if address.street.len() > MAX_ADDRESS_LEN {
        return Err(invalid(format!("{field}: street is too long")));
    }
    if address.area.len() > MAX_SHORT_TEXT_LEN {
        return Err(invalid(format!("{field}: area is too long")));
    }
    validate_optional_text(&address.landmark, "landmark", MAX_ADDRESS_LEN)?;

    let lga = address.canonical_lga().ok_or_else(|| {
        invalid(format!(
            "{field}: '{}' is not a Lagos Local Government Area",
            address.lga
        ))
        .with_detail("lga", address.lga.clone())
    })?;

    let mut normalized = address.clone();
    normalized.lga = lga.to_string();
    Ok(normalized)
}

/// Loose email check (format only; delivery is verified by the auth platform).
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation(format!("Invalid email address: {email}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(lga: &str) -> Address {
        Address {
            street: "5 Bode Thomas St".into(),
            area: "Surulere".into(),
            lga: lga.into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            landmark: None,
        }
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Wash & Fold", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_address_normalizes_lga() {
        let normalized = validate_address(&address("surulere"), "pickup_address").unwrap();
        assert_eq!(normalized.lga, "Surulere");
    }

    #[test]
    fn test_address_rejects_unknown_lga() {
        let err = validate_address(&address("Garki"), "pickup_address").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAddress);
        assert!(err.message.contains("Garki"));
    }

    #[test]
    fn test_address_requires_street() {
        let mut a = address("Ikeja");
        a.street = " ".into();
        assert_eq!(
            validate_address(&a, "pickup_address").unwrap_err().code,
            ErrorCode::InvalidAddress
        );
    }

    #[test]
    fn test_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
