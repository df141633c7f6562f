//! Account model.
//!
//! # Invariants
//! - `username` is case-sensitive and globally unique.
//! - `password_hash` is an Argon2 PHC string; plaintext never reaches storage.

use crate::model::validation::ValidationError;

/// Registered account as persisted by a credential repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

/// Checks a username before it is hashed against or persisted.
///
/// Commas and control characters are rejected because the flat-file
/// credential layout is one `username,hash` line per account.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if username.chars().any(|ch| ch == ',' || ch.is_control()) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_username;
    use crate::model::validation::ValidationError;

    #[test]
    fn accepts_plain_and_mixed_case_names() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice.Smith").is_ok());
    }

    #[test]
    fn rejects_blank_and_separator_characters() {
        assert_eq!(validate_username(""), Err(ValidationError::EmptyUsername));
        assert_eq!(validate_username("  "), Err(ValidationError::EmptyUsername));
        assert!(matches!(
            validate_username("a,b"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username("a\nb"),
            Err(ValidationError::InvalidUsername(_))
        ));
    }
}
