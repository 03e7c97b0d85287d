use crate::core::domain::error::ValidationError;

/// Validates a deployment name before it is placed into a request path.
pub(crate) fn validate_deployment_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Field {
            field: "deployment".to_string(),
            message: "Deployment name cannot be empty".to_string(),
        });
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.';
    if !name.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Deployment name contains invalid characters. Allowed: alphanumeric, -, _, ."
                .to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(ValidationError::ConstraintViolation(format!(
            "'{name}' is not a deployment name"
        )));
    }
    Ok(())
}
