// Login and the read-only queries the shell makes against a snapshot.

use crate::error::{Result, UploaderError};
use crate::hierarchy::{build_hierarchy, HierarchySnapshot};
use crate::remote::PhotoService;
use std::fmt;
use tracing::info;

/// Login name and password for one session. Kept in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    login: String,
    password: String,
}

impl Credential {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Credential {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_complete(&self) -> bool {
        !self.login.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticate and load the Group/PhotoSet hierarchy for this account.
pub fn login<S: PhotoService + ?Sized>(service: &mut S, credential: &Credential) -> Result<HierarchySnapshot> {
    if !credential.is_complete() {
        return Err(UploaderError::AuthFailure);
    }
    service.authenticate(credential)?;
    info!(login = credential.login(), "logged in");
    build_hierarchy(&*service)
}

/// PhotoSet titles under `group_title`, empty when the Group is unknown.
pub fn list_photo_sets(snapshot: &HierarchySnapshot, group_title: &str) -> Vec<String> {
    snapshot.photo_sets(group_title).to_vec()
}
