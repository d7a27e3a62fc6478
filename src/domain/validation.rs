//! Client-side form validation

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::DomainError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Checks for the login form: email present and well-formed, password present.
pub fn validate_login(email: &str, password: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::EmptyField("email"));
    }
    if !is_valid_email(email) {
        return Err(DomainError::InvalidEmail(email.to_string()));
    }
    if password.is_empty() {
        return Err(DomainError::EmptyField("password"));
    }
    Ok(())
}

/// Checks for the registration form; adds strength and confirmation checks.
pub fn validate_registration(email: &str, password: &str, confirm: &str) -> Result<(), DomainError> {
    validate_login(email, password)?;
    if !is_valid_password(password) {
        return Err(DomainError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirm {
        return Err(DomainError::PasswordMismatch);
    }
    Ok(())
}

/// Parse a required integer form field.
pub fn parse_node_value(field: &'static str, input: &str) -> Result<i64, DomainError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DomainError::EmptyField(field));
    }
    input.parse().map_err(|_| DomainError::InvalidNumber {
        field,
        input: input.to_string(),
    })
}

/// Tree session names must not be blank.
pub fn validate_tree_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::EmptyField("tree name"));
    }
    Ok(name.to_string())
}
