/// Collaborator seams for the hosted auth platform
///
/// The session authority never talks to the hosted backend directly; it
/// consumes these two traits so the application can inject the real
/// platform SDK and tests can inject mocks.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ProfileFetchError, SignInError, SignOutError};

use super::profile::Profile;

/// The identity provider's record of a signed-in principal.
///
/// Held only while a session is active; the provider owns the full
/// record, this is the slice the session layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Sign-in credentials, passed through to the provider and never stored
#[derive(Debug, Clone)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

/// One auth-state transition: `Some` on sign-in, `None` on sign-out
pub type AuthChange = Option<Identity>;

/// The hosted identity backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stream of auth-state changes. The provider emits the current state
    /// immediately on subscription (bootstrap), then every transition.
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthChange>;

    /// Authenticate with the backend. The resulting state change arrives
    /// through the subscription stream, not through the return value.
    async fn sign_in(&self, credential: &Credential) -> Result<Identity, SignInError>;

    /// End the backend session. Must tolerate being called when no one
    /// is signed in.
    async fn sign_out(&self) -> Result<(), SignOutError>;
}

/// The hosted profile-document store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile document for an identity id.
    async fn fetch_profile(&self, identity_id: &str) -> Result<Profile, ProfileFetchError>;
}
