use crate::core::domain::error::ValidationError;
use url::Url;

/// RFC 7230 practical limit.
const MAX_URL_LENGTH: usize = 2083;

/// A validated base URL of a director, e.g. `https://192.168.50.4:25555`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorUrl(Url);

impl DirectorUrl {
    /// Parses and validates a director base URL.
    ///
    /// # Errors
    /// Returns `ValidationError` if the URL is not an absolute http(s) URL
    /// without query, fragment or credentials.
    pub fn new(url: &str) -> Result<Self, ValidationError> {
        validate_url(url).map(Self)
    }

    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: Url) -> Self {
        Self(url)
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Resolves an API path, optionally carrying a query string, against the base.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Validates and parses a director base URL.
pub(crate) fn validate_url(url: &str) -> Result<Url, ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {MAX_URL_LENGTH} characters"
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL must include a host".to_string(),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Director URL cannot carry a query or fragment".to_string(),
        ));
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Credentials must be configured separately, not embedded in the URL".to_string(),
        ));
    }

    Ok(parsed)
}
