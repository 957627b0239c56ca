//! Email addresses used as the log-in name.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A trimmed, lower-cased email address with a plausible shape.
///
/// Only the shape is checked: exactly one `@`, a non-empty local part, and a
/// domain with a dot that does not start or end the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Normalise and validate `raw_email`.
    ///
    /// # Errors
    /// Returns [Error::InvalidEmail] if the address does not look like an
    /// email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        let (local, domain) = email.split_once('@').ok_or(Error::InvalidEmail)?;

        let is_valid = !local.is_empty()
            && !domain.contains('@')
            && !email.chars().any(char::is_whitespace)
            && domain
                .split_once('.')
                .is_some_and(|(name, _)| !name.is_empty())
            && !domain.ends_with('.');

        if is_valid {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail)
        }
    }

    /// Create an email without validation, e.g. for values read back from
    /// the database.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
