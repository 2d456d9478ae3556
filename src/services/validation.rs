//! Input checks shared by registration, account creation and profile updates.
//!
//! Each check returns a human-readable reason; callers attach it to the offending field.

use crate::auth::password::MAX_PASSWORD_BYTES;

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 254;

/// Trim and lowercase an email so lookups and uniqueness ignore case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if name.chars().count() > MAX_NAME_CHARS {
        return Err(format!("Name must be at most {} characters", MAX_NAME_CHARS));
    }

    Ok(())
}

/// Validate email format
///
/// Expects an already-normalized address. One `@`, a non-empty local part, and a dotted
/// domain whose labels are non-empty.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.chars().count() > MAX_EMAIL_CHARS || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let (local, domain) = email.split_once('@').ok_or("Invalid email format")?;
    if local.is_empty() || domain.contains('@') {
        return Err("Invalid email format".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password length against the configured minimum and the bcrypt input limit
pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("Password must be at least {} characters", min_length));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!("Password must be at most {} bytes", MAX_PASSWORD_BYTES));
    }

    Ok(())
}
