//! Credential use-case service.
//!
//! # Responsibility
//! - Register accounts with salted Argon2id password hashes.
//! - Verify passwords and mint the [`Identity`] that gates task access.
//!
//! # Invariants
//! - Plaintext passwords are never persisted or compared directly.
//! - Unknown usernames and wrong passwords are indistinguishable to callers:
//!   `verify` returns `Ok(false)` for both, `login` fails with
//!   `InvalidCredentials` for both.
//! - A stored hash that is not a PHC string is reported as invalid data.

use crate::model::user::{validate_username, User};
use crate::model::validation::ValidationError;
use crate::repo::{CredentialRepository, RepoError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use log::{info, warn};
use once_cell::unsync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DUMMY_PASSWORD: &str = "mytasks-timing-equalizer";

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure of a credential operation.
#[derive(Debug)]
pub enum AuthError {
    /// Registration with a username that is already taken.
    AlreadyExists(String),
    /// Login failed: unknown user or wrong password.
    InvalidCredentials,
    Validation(ValidationError),
    /// Password hashing backend failure.
    Hash(String),
    Storage(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(_) => write!(f, "Username already exists"),
            Self::InvalidCredentials => write!(f, "Invalid username or passcode"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Hash(message) => write!(f, "password hashing failed: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::AlreadyExists(username) => Self::AlreadyExists(username),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// Authenticated account handle.
///
/// Only [`AuthService::login`] can mint one, so holding an `Identity` proves
/// the password was checked. Callers thread it explicitly into task calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Credential service facade over a [`CredentialRepository`].
pub struct AuthService<R: CredentialRepository> {
    repo: R,
    hasher: Argon2<'static>,
    dummy_hash: OnceCell<Option<String>>,
}

impl<R: CredentialRepository> AuthService<R> {
    /// Creates a service hashing with Argon2id default parameters.
    pub fn new(repo: R) -> Self {
        Self::with_hasher(repo, Argon2::default())
    }

    /// Creates a service with explicit Argon2id cost parameters.
    ///
    /// Hashes embed their parameters, so hashes written with other costs
    /// still verify.
    pub fn with_cost(
        repo: R,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| AuthError::Hash(format!("argon2 params: {err}")))?;
        Ok(Self::with_hasher(
            repo,
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        ))
    }

    fn with_hasher(repo: R, hasher: Argon2<'static>) -> Self {
        Self {
            repo,
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// - `Validation` for a blank/invalid username or an empty password.
    /// - `AlreadyExists` when the username is taken; the stored record is
    ///   left unchanged.
    /// - `Storage` when persistence fails; the user stays unregistered.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        let user = User {
            username: username.to_string(),
            password_hash: self.hash_password(password)?,
        };

        match self.repo.insert_user(&user) {
            Ok(()) => {
                info!("event=user_register module=auth status=ok");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=user_register module=auth status=error error_code={}",
                    error_code(&err)
                );
                Err(err.into())
            }
        }
    }

    /// Checks a password against the stored hash.
    ///
    /// Returns `Ok(false)` for unknown usernames as well as wrong passwords.
    pub fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(stored) = self.repo.find_password_hash(username)? else {
            // Burn comparable time so response latency does not reveal
            // whether the account exists.
            if let Some(dummy) = self.dummy_hash() {
                let _ = self.check_password(password, dummy);
            }
            return Ok(false);
        };

        self.check_password(password, &stored)
    }

    /// Verifies credentials and returns the authenticated identity.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<Identity> {
        if self.verify(username, password)? {
            info!("event=user_login module=auth status=ok");
            Ok(Identity {
                username: username.to_string(),
            })
        } else {
            warn!("event=user_login module=auth status=rejected error_code=invalid_credentials");
            Err(AuthError::InvalidCredentials)
        }
    }

    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hash(err.to_string()))
    }

    fn check_password(&self, password: &str, stored: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(stored).map_err(|_| {
            AuthError::Storage(RepoError::InvalidData(
                "stored credential is not a password hash".to_string(),
            ))
        })?;

        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AuthError::Hash(err.to_string())),
        }
    }

    fn dummy_hash(&self) -> Option<&str> {
        self.dummy_hash
            .get_or_init(|| self.hash_password(DUMMY_PASSWORD).ok())
            .as_deref()
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::AlreadyExists(_) => "already_exists",
        RepoError::UnknownOwner(_) => "unknown_owner",
        RepoError::Validation(_) => "validation",
        RepoError::Db(_) => "db_error",
        RepoError::Io(_) => "io_error",
        RepoError::InvalidData(_) => "invalid_data",
    }
}
