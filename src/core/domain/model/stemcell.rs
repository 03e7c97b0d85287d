//! Domain model for stemcells from the `/stemcells` endpoint.

use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};

/// A VM image template uploaded to the director.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stemcell {
    /// Stemcell name (e.g., "bosh-warden-boshlite-ubuntu").
    pub name: String,
    /// Stemcell version (e.g., "993").
    pub version: String,
    /// Cloud identifier of the image.
    pub cid: String,
    /// Deployments currently using this stemcell.
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub deployments: Vec<String>,
}
