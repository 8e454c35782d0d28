//! Password hashing using Argon2id, with read-only support for bcrypt hashes
//! imported from the previous system.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params,
};
use gymdesk_config::SecurityConfig;
use gymdesk_core::{GymdeskError, GymdeskResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Password hasher service using Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
    params: Params,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a new password hasher with custom parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params.clone());
        Self {
            argon2: Arc::new(argon2),
            params,
        }
    }

    /// Creates a password hasher from the configured memory and time cost.
    ///
    /// Out-of-range values fall back to the Argon2 defaults.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        let params = Params::new(config.password_memory_cost_kib, config.password_time_cost, 1, None)
            .unwrap_or_else(|e| {
                warn!("Invalid Argon2 parameters ({}), using defaults", e);
                Params::DEFAULT
            });

        Self::with_params(params)
    }

    /// Hashes a password.
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails.
    pub fn hash(&self, password: &str) -> GymdeskResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| GymdeskError::Internal(format!("Failed to hash password: {e}")))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    /// Verifies a password against an Argon2 or legacy bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the stored hash is malformed.
    pub fn verify(&self, password: &str, hash: &str) -> GymdeskResult<bool> {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| GymdeskError::Internal(format!("Password verification error: {e}")));
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| GymdeskError::Internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(GymdeskError::Internal(format!("Password verification error: {e}"))),
        }
    }

    /// Checks if a hash should be replaced after a successful login.
    ///
    /// True for bcrypt hashes and for Argon2 hashes made with other costs.
    #[must_use]
    pub fn needs_rehash(&self, hash: &str) -> bool {
        if is_bcrypt(hash) {
            return true;
        }
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != argon2::Algorithm::Argon2id.ident() {
            return true;
        }
        match Params::try_from(&parsed) {
            Ok(params) => params.m_cost() != self.params.m_cost() || params.t_cost() != self.params.t_cost(),
            Err(_) => true,
        }
    }
}

fn is_bcrypt(hash: &str) -> bool {
    hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$")
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish_non_exhaustive()
    }
}
