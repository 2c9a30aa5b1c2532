//! Identity and session values.
//!
//! The session decides two things: which cache entry the task list lives
//! under, and whether a remote subscription should be open.

use crate::{task::LOCAL_OWNER, Uid};
use serde::{Deserialize, Serialize};

/// Cache key segment used while signed out.
pub const GUEST_KEY: &str = "guest";

/// Prefix for per-identity task cache keys.
pub const TASKS_KEY_PREFIX: &str = "tasks:";

/// How an identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// Username-only sign-in, kept on the device
    Local,
    /// Signed in against the identity provider backing the document store
    Remote,
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: Uid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub kind: AuthKind,
}

impl Identity {
    /// A device-only identity named by a username.
    pub fn local(username: impl Into<Uid>) -> Self {
        Self {
            uid: username.into(),
            email: None,
            display_name: None,
            kind: AuthKind::Local,
        }
    }

    /// An identity authenticated against the remote provider.
    pub fn remote(uid: impl Into<Uid>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
            display_name: None,
            kind: AuthKind::Remote,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn is_remote(&self) -> bool {
        self.kind == AuthKind::Remote
    }

    /// Best label for showing who is signed in.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Current authentication state, passed explicitly to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::SignedOut => None,
            Session::SignedIn(identity) => Some(identity),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn(_))
    }

    /// Cache key for this session's task list.
    pub fn storage_key(&self) -> String {
        let owner = self.identity().map_or(GUEST_KEY, |i| i.uid.as_str());
        tasks_key(owner)
    }

    /// Owner to subscribe for, if this session syncs remotely.
    pub fn sync_owner(&self) -> Option<&str> {
        self.identity()
            .filter(|i| i.is_remote())
            .map(|i| i.uid.as_str())
    }

    /// Owner recorded on newly created tasks.
    pub fn task_owner(&self) -> &str {
        self.sync_owner().unwrap_or(LOCAL_OWNER)
    }
}

impl From<Option<Identity>> for Session {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Session::SignedOut, Session::SignedIn)
    }
}

/// Build the cache key for an owner segment.
pub fn tasks_key(owner: &str) -> String {
    format!("{TASKS_KEY_PREFIX}{owner}")
}
