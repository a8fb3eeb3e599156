//! User domain entity and related types.

use serde::Serialize;

use crate::constants::{MAX_LOGIN_LENGTH, MIN_LOGIN_LENGTH};
use crate::error::{DomainError, DomainResult};
use crate::password::Password;

/// Registered user of the listings board.
///
/// Two users are equal when they share the same id.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub login: String,
    #[serde(skip_serializing)]
    pub password: Password,
}

impl User {
    pub fn new(id: i32, login: String, password: Password) -> Self {
        Self {
            id,
            login,
            password,
        }
    }

    /// Check a plain text password against the stored hash
    pub fn verify_password(&self, plain_text: &str) -> bool {
        self.password.verify(plain_text)
    }

    /// Replace the login after validating it
    pub fn change_login(&mut self, login: impl Into<String>) -> DomainResult<()> {
        let login = login.into();
        validate_login(&login)?;
        self.login = login;
        Ok(())
    }

    /// Hash and replace the password
    pub fn change_password(&mut self, plain_text: &str) -> DomainResult<()> {
        self.password = Password::new(plain_text)?;
        Ok(())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// User creation data, the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password: Password,
}

impl NewUser {
    /// Validate the login and hash the plain text password.
    pub fn new(login: impl Into<String>, plain_password: &str) -> DomainResult<Self> {
        let login = login.into();
        validate_login(&login)?;
        Ok(Self {
            login,
            password: Password::new(plain_password)?,
        })
    }

    /// Attach the store-assigned id.
    pub fn into_user(self, id: i32) -> User {
        User::new(id, self.login, self.password)
    }
}

fn validate_login(login: &str) -> DomainResult<()> {
    let len = login.trim().chars().count();
    if len < MIN_LOGIN_LENGTH {
        return Err(DomainError::validation("Login must not be empty"));
    }
    if login.chars().count() > MAX_LOGIN_LENGTH {
        return Err(DomainError::validation(format!(
            "Login must be at most {} characters",
            MAX_LOGIN_LENGTH
        )));
    }
    Ok(())
}
