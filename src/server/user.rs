//! Server principals.

use serde::{Deserialize, Serialize};

/// A named principal with a password, used both for SQL sessions and for
/// remote command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    #[serde(default)]
    password: String,
}

impl User {
    /// Create a principal.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// The principal's login name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The principal's password; may be empty.
    pub fn password(&self) -> &str {
        &self.password
    }
}
