use crate::core::domain::value_object::{DirectorAuth, DirectorUrl};

/// Where the director lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct DirectorConnection {
    url: DirectorUrl,
    auth: Option<DirectorAuth>,
    accept_invalid_certs: bool,
}

impl DirectorConnection {
    pub fn new(url: DirectorUrl, auth: Option<DirectorAuth>, accept_invalid_certs: bool) -> Self {
        Self {
            url,
            auth,
            accept_invalid_certs,
        }
    }

    pub fn url(&self) -> &DirectorUrl {
        &self.url
    }

    pub fn auth(&self) -> Option<&DirectorAuth> {
        self.auth.as_ref()
    }

    /// Directors commonly run with self-signed certificates.
    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
