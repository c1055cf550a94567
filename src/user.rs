//! Logged-in principal and the per-user storage namespace

use std::fmt;

use crate::error::{Error, Result};

/// Principal supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: String,
}

impl Identity {
    pub fn new(name: Option<String>, email: impl Into<String>) -> Self {
        Self {
            name,
            email: email.into(),
        }
    }

    /// Greeting name, falls back to the email local part
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    pub fn user(&self) -> Result<User> {
        User::from_email(&self.email)
    }
}

/// Filesystem-safe user namespace: email local part, dots as underscores.
///
/// `john.doe@example.com` and `john_doe@other.org` share a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User(String);

impl User {
    pub fn from_email(email: &str) -> Result<Self> {
        let local = email.split('@').next().unwrap_or_default().trim();
        if local.is_empty() {
            return Err(Error::InvalidIdentity(format!("no local part in '{}'", email)));
        }
        if local.contains(['/', '\\']) {
            return Err(Error::InvalidIdentity(format!("unsafe email '{}'", email)));
        }
        Ok(Self(local.replace('.', "_")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
