//! Login credentials and account registration input.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// Login credentials for the backend.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use duet_core::Credentials;
///
/// let creds = Credentials::new("alice", "correct horse");
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Input for creating a new account.
///
/// Field bounds mirror the backend's: usernames are 3 to 50 characters,
/// nicknames 1 to 50, passwords 6 to 100, and the email must look like an
/// address. Violations are reported before any request is sent.
#[derive(Clone)]
pub struct Registration {
    username: String,
    email: String,
    nickname: String,
    password: String,
}

impl Registration {
    /// Validate and build a registration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Field`] naming the first offending field.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        nickname: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        let registration = Self {
            username: username.into(),
            email: email.into(),
            nickname: nickname.into(),
            password: password.into(),
        };

        check_length("username", &registration.username, 3, 50)?;
        check_email(&registration.email)?;
        check_length("nickname", &registration.nickname, 1, 50)?;
        check_length("password", &registration.password, 6, 100)?;

        Ok(registration)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the registration request.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Credentials for logging in as the registered account.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), Error> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(InvalidInputError::Field {
            field,
            reason: format!("must be {} to {} characters, got {}", min, max, len),
        }
        .into());
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), Error> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };

    if !valid {
        return Err(InvalidInputError::Field {
            field: "email",
            reason: format!("'{}' is not an email address", value),
        }
        .into());
    }
    Ok(())
}
