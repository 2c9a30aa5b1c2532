//! Authentication providers.
//!
//! A provider turns credentials into a [`Session`]. The session is then
//! handed to the task service explicitly; providers never reach into it.

mod local;
mod memory;

pub use local::{LocalAuth, AUTH_USER_KEY};
pub use memory::{MemoryAuthProvider, MIN_PASSWORD_LEN};

use async_trait::async_trait;
use justdo_engine::Session;

/// Authentication errors.
///
/// All of them are recoverable; [`user_message`](Self::user_message) gives
/// text suitable for showing next to the form that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("password shorter than {min} characters")]
    WeakPassword { min: usize },

    #[error("email already in use: {0}")]
    EmailInUse(String),

    #[error("no account for {0}")]
    UserNotFound(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("not signed in")]
    NotSignedIn,

    #[error("credential storage failed: {0}")]
    Storage(String),
}

impl AuthError {
    /// Short message for the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidEmail(_) => "Please enter a valid email address.".into(),
            AuthError::WeakPassword { min } => {
                format!("Password must be at least {min} characters.")
            }
            AuthError::EmailInUse(_) => "An account with this email already exists.".into(),
            AuthError::UserNotFound(_) => "No account found for this email.".into(),
            AuthError::WrongPassword => "Incorrect password.".into(),
            AuthError::EmptyUsername => "Please enter a username.".into(),
            AuthError::NotSignedIn => "You need to sign in first.".into(),
            AuthError::Storage(_) => "Something went wrong. Please try again.".into(),
        }
    }
}

/// Result type for authentication calls.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Signs users in and out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Session>;

    /// Sign in to an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Sign out. Signing out while signed out is fine.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Change the signed-in user's display name.
    async fn update_display_name(&self, name: &str) -> AuthResult<Session>;

    /// The current session.
    fn current(&self) -> Session;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_friendly() {
        assert_eq!(
            AuthError::WeakPassword { min: 6 }.user_message(),
            "Password must be at least 6 characters."
        );
        assert_eq!(
            AuthError::EmailInUse("a@b.co".into()).user_message(),
            "An account with this email already exists."
        );
        // Internal detail stays out of the user message
        assert!(!AuthError::Storage("disk full".into())
            .user_message()
            .contains("disk"));
    }
}
