//! # Actor Identity Resolution
//!
//! Every engagement fact is keyed by an actor identity: the server-issued
//! user id when a session exists, otherwise a guest id generated once and
//! persisted in durable local storage.
//!
//! The session source and the storage are injected rather than read from
//! ambient state, so tests can substitute either and identity resolution
//! stays deterministic.
//!
//! Resolution never fails: any storage trouble falls back to a freshly
//! generated guest id held for the rest of the session.

use std::sync::Arc;

use uuid::Uuid;

use crate::client::storage::{LocalStore, GUEST_ID_KEY};

/// A resolved actor identity.
///
/// Guest ids carry the `guest_` namespace tag; anything else is a
/// server-issued user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorId(String);

impl ActorId {
    pub fn user(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_guest(&self) -> bool {
        self.0.starts_with("guest_")
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the authenticated user id, if any.
///
/// The real implementation wraps the storefront's session service; it is a
/// boundary contract here.
pub trait AuthSession: Send + Sync {
    /// The authenticated user id, or `None` when browsing as a guest.
    fn current_user_id(&self) -> Option<String>;
}

/// An `AuthSession` with nobody signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl AuthSession for NoSession {
    fn current_user_id(&self) -> Option<String> {
        None
    }
}

/// Resolves the active actor identity.
pub trait IdentityProvider: Send + Sync {
    /// The identity all new engagement writes are attributed to.
    fn resolve(&self) -> ActorId;
}

/// Identity provider combining an auth session with durable guest storage.
///
/// An authenticated id always supersedes the guest id; the guest id itself
/// is stable across calls and across restarts of the client.
pub struct ClientIdentity<S: AuthSession> {
    session: S,
    store: Arc<LocalStore>,
}

impl<S: AuthSession> ClientIdentity<S> {
    pub fn new(session: S, store: Arc<LocalStore>) -> Self {
        Self { session, store }
    }
}

impl<S: AuthSession> IdentityProvider for ClientIdentity<S> {
    fn resolve(&self) -> ActorId {
        if let Some(user_id) = self.session.current_user_id() {
            return ActorId::user(user_id);
        }

        if let Some(existing) = self.store.get::<String>(GUEST_ID_KEY) {
            return ActorId(existing);
        }

        let guest_id = generate_guest_id();
        if let Err(e) = self.store.set(GUEST_ID_KEY, &guest_id) {
            // The id still identifies this session; it just won't survive a
            // restart.
            tracing::warn!("Failed to persist guest id: {}", e);
        }
        ActorId(guest_id)
    }
}

/// Generate a new guest identifier: the `guest_` tag plus 12 base-36
/// characters of randomness, unique enough across concurrent first-time
/// visitors.
fn generate_guest_id() -> String {
    let encoded = base36(Uuid::new_v4().as_u128());
    let tail: String = encoded.chars().take(12).collect();
    format!("guest_{:0>12}", tail)
}

fn base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out: Vec<char> = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out.reverse();
    out.into_iter().collect()
}
