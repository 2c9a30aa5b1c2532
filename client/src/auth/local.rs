//! Username-only sign-in kept on the device.

use std::sync::Arc;

use async_trait::async_trait;
use justdo_engine::{Identity, Session};
use tokio::sync::watch;

use super::{AuthError, AuthProvider, AuthResult};
use crate::kv::KeyValueStore;

/// Key holding the signed-in username.
pub const AUTH_USER_KEY: &str = "auth:user";

/// Local identities persisted in the key-value store.
///
/// Only the username is stored. Display names set with
/// [`update_display_name`](AuthProvider::update_display_name) last until
/// the next restore.
pub struct LocalAuth {
    kv: Arc<dyn KeyValueStore>,
    session: watch::Sender<Session>,
}

impl LocalAuth {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (session, _) = watch::channel(Session::SignedOut);
        Self { kv, session }
    }

    /// Read the stored username, if any, and sign it in.
    pub async fn restore(&self) -> Session {
        let session = match self.kv.get(AUTH_USER_KEY).await {
            Ok(Some(username)) if !username.trim().is_empty() => {
                Session::SignedIn(Identity::local(username.trim()))
            }
            Ok(_) => Session::SignedOut,
            Err(e) => {
                tracing::warn!("Failed to read stored user: {}", e);
                Session::SignedOut
            }
        };
        self.session.send_replace(session.clone());
        session
    }

    /// Session changes.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    async fn login(&self, username: &str, display_name: Option<&str>) -> AuthResult<Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        self.kv
            .set(AUTH_USER_KEY, username)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut identity = Identity::local(username);
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            identity = identity.with_display_name(name);
        }

        tracing::info!(uid = %identity.uid, "Signed in locally");
        let session = Session::SignedIn(identity);
        self.session.send_replace(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_up(
        &self,
        username: &str,
        _password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Session> {
        self.login(username, display_name).await
    }

    async fn sign_in(&self, username: &str, _password: &str) -> AuthResult<Session> {
        self.login(username, None).await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.kv
            .remove(AUTH_USER_KEY)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.session.send_replace(Session::SignedOut);
        tracing::info!("Signed out");
        Ok(())
    }

    async fn update_display_name(&self, name: &str) -> AuthResult<Session> {
        let mut updated = None;
        self.session.send_if_modified(|session| match session {
            Session::SignedIn(identity) => {
                identity.display_name = Some(name.trim().to_string());
                updated = Some(session.clone());
                true
            }
            Session::SignedOut => false,
        });
        updated.ok_or(AuthError::NotSignedIn)
    }

    fn current(&self) -> Session {
        self.session.borrow().clone()
    }
}

impl std::fmt::Debug for LocalAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAuth")
            .field("session", &*self.session.borrow())
            .finish_non_exhaustive()
    }
}
