mod deployment_name;
mod director_credentials;
mod director_url;
pub mod serde_helpers;

pub use director_credentials::{DirectorAuth, DirectorPassword, DirectorUsername};
pub use director_url::DirectorUrl;

// Re-export validation functions for internal use
pub(crate) use deployment_name::validate_deployment_name;
pub(crate) use director_credentials::{validate_password, validate_token, validate_username};
pub(crate) use director_url::validate_url;
