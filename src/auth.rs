use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, PoisonError};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use log::info;

const MIN_PASSWORD_LEN: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Login must not be empty")]
    EmptyLogin,

    #[error("Password is too short")]
    WeakPassword,

    #[error("Login {0} is already taken")]
    LoginTaken(String),

    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Password hashing failed")]
    HashingFailed,
}

/// Login to argon2 hash mapping. The wallet core never sees credentials;
/// it trusts the login string this store has verified.
#[derive(Default)]
pub struct CredentialStore {
    users: Mutex<HashMap<String, String>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, login: &str, password: &str) -> Result<(), AuthError> {
        if login.trim().is_empty() {
            return Err(AuthError::EmptyLogin);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string();

        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        match users.entry(login.to_string()) {
            Entry::Occupied(_) => Err(AuthError::LoginTaken(login.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(hash);
                info!("credentials stored for {}", login);
                Ok(())
            }
        }
    }

    /// Uniform failure for unknown logins and wrong passwords.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<(), AuthError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = users.get(login).ok_or(AuthError::InvalidCredentials)?;
        let parsed = PasswordHash::new(stored).map_err(|_| AuthError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}
