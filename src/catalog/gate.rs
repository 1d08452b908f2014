use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;

use super::error::{CatalogError, CatalogResult};

/// Whether the caller behind a session may perform admin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessState {
    #[default]
    Anonymous,
    Authenticated,
}

impl AccessState {
    pub fn is_admin(self) -> bool {
        matches!(self, AccessState::Authenticated)
    }

    pub fn require_admin(self) -> CatalogResult<()> {
        match self {
            AccessState::Authenticated => Ok(()),
            AccessState::Anonymous => Err(CatalogError::Unauthorized),
        }
    }

    /// Returns the state after a logout request.
    pub fn logout(self) -> AccessState {
        AccessState::Anonymous
    }
}

/// The single admin account. Only an argon2 hash of the password is retained.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, argon2::password_hash::Error> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn login(&self, username: &str, password: &str) -> CatalogResult<AccessState> {
        // Verify the password even on a username mismatch so both paths cost the same.
        let password_ok = verify_password(password, &self.password_hash);
        if username == self.username && password_ok {
            Ok(AccessState::Authenticated)
        } else {
            Err(CatalogError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}
