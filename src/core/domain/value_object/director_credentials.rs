use crate::core::domain::error::ValidationError;
use std::fmt;

/// A validated director username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorUsername(String);

impl DirectorUsername {
    /// Creates a new username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A director password (plaintext, never printed).
#[derive(Clone, PartialEq, Eq)]
pub struct DirectorPassword(String);

impl DirectorPassword {
    /// Creates a new password without validation.
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DirectorPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DirectorPassword(***)")
    }
}

/// How requests authenticate against the director.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorAuth {
    /// HTTP basic authentication.
    Basic {
        username: DirectorUsername,
        password: DirectorPassword,
    },
    /// An OAuth bearer token issued by UAA.
    Bearer(DirectorPassword),
}

/// Validates a username for HTTP basic authentication.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() > 256 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 256 characters (got {})",
            username.len()
        )));
    }
    if username.contains(':') {
        return Err(ValidationError::ConstraintViolation(
            "Username cannot contain ':' when using basic authentication".to_string(),
        ));
    }
    if username.chars().any(char::is_control) {
        return Err(ValidationError::Format(
            "Username cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validates a password for HTTP basic authentication.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    if password.len() > 1024 {
        return Err(ValidationError::Format(
            "Password cannot exceed 1024 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validates a bearer token. Tokens go into a header value verbatim.
pub(crate) fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "token".to_string(),
            message: "Token cannot be empty".to_string(),
        });
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::Format(
            "Token may only contain visible ASCII characters".to_string(),
        ));
    }
    Ok(())
}
