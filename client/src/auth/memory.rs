//! In-memory email/password accounts.

use async_trait::async_trait;
use dashmap::DashMap;
use justdo_engine::{Identity, Session, Uid};
use tokio::sync::watch;

use super::{AuthError, AuthProvider, AuthResult};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: Uid,
    password: String,
    display_name: Option<String>,
}

/// Email/password provider producing remote identities.
///
/// Stands in for a hosted identity service: accounts live for the life of
/// the value, and each gets a random uid.
#[derive(Debug)]
pub struct MemoryAuthProvider {
    /// Accounts by lowercased email
    accounts: DashMap<String, Account>,
    session: watch::Sender<Session>,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(Session::SignedOut);
        Self {
            accounts: DashMap::new(),
            session,
        }
    }

    /// Session changes.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    fn signed_in(&self, email: &str, account: &Account) -> Session {
        let mut identity = Identity::remote(account.uid.clone(), Some(email.to_string()));
        if let Some(name) = &account.display_name {
            identity = identity.with_display_name(name.clone());
        }
        let session = Session::SignedIn(identity);
        self.session.send_replace(session.clone());
        session
    }
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        return Err(AuthError::InvalidEmail(email));
    }
    Ok(email)
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Session> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let account = match self.accounts.entry(email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AuthError::EmailInUse(email));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => slot
                .insert(Account {
                    uid: uuid::Uuid::new_v4().to_string(),
                    password: password.to_string(),
                    display_name: display_name
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                })
                .value()
                .clone(),
        };

        tracing::info!(uid = %account.uid, "Account created");
        Ok(self.signed_in(&email, &account))
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email)?;
        let account = self
            .accounts
            .get(&email)
            .map(|a| a.value().clone())
            .ok_or_else(|| AuthError::UserNotFound(email.clone()))?;

        if account.password != password {
            tracing::debug!(uid = %account.uid, "Rejected sign-in");
            return Err(AuthError::WrongPassword);
        }

        tracing::info!(uid = %account.uid, "Signed in");
        Ok(self.signed_in(&email, &account))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.session.send_replace(Session::SignedOut);
        Ok(())
    }

    async fn update_display_name(&self, name: &str) -> AuthResult<Session> {
        let email = self
            .current()
            .identity()
            .and_then(|i| i.email.clone())
            .ok_or(AuthError::NotSignedIn)?;

        let account = {
            let mut account = self
                .accounts
                .get_mut(&email)
                .ok_or_else(|| AuthError::UserNotFound(email.clone()))?;
            account.display_name = Some(name.trim().to_string());
            account.value().clone()
        };
        Ok(self.signed_in(&email, &account))
    }

    fn current(&self) -> Session {
        self.session.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let auth = MemoryAuthProvider::new();
        let created = auth
            .sign_up("Ada@Example.com", "secret1", Some("Ada"))
            .await
            .unwrap();
        let uid = created.sync_owner().unwrap().to_string();

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current(), Session::SignedOut);

        let session = auth.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(session.sync_owner(), Some(uid.as_str()));
        assert_eq!(session.identity().unwrap().label(), "Ada");
    }

    #[tokio::test]
    async fn sign_up_errors() {
        let auth = MemoryAuthProvider::new();

        assert!(matches!(
            auth.sign_up("not-an-email", "secret1", None).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert_eq!(
            auth.sign_up("a@b.co", "12345", None).await,
            Err(AuthError::WeakPassword { min: 6 })
        );

        auth.sign_up("a@b.co", "123456", None).await.unwrap();
        assert_eq!(
            auth.sign_up("A@B.co", "123456", None).await,
            Err(AuthError::EmailInUse("a@b.co".into()))
        );
    }

    #[tokio::test]
    async fn sign_in_errors() {
        let auth = MemoryAuthProvider::new();
        assert!(matches!(
            auth.sign_in("nobody@b.co", "123456").await,
            Err(AuthError::UserNotFound(_))
        ));

        auth.sign_up("a@b.co", "123456", None).await.unwrap();
        assert_eq!(
            auth.sign_in("a@b.co", "654321").await,
            Err(AuthError::WrongPassword)
        );
    }

    #[tokio::test]
    async fn display_name_update() {
        let auth = MemoryAuthProvider::new();
        assert_eq!(
            auth.update_display_name("x").await,
            Err(AuthError::NotSignedIn)
        );

        auth.sign_up("a@b.co", "123456", None).await.unwrap();
        auth.update_display_name(" Bea ").await.unwrap();
        auth.sign_out().await.unwrap();

        let session = auth.sign_in("a@b.co", "123456").await.unwrap();
        assert_eq!(session.identity().unwrap().display_name.as_deref(), Some("Bea"));
    }
}
