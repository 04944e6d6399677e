/// Session authority: the one place session state changes
///
/// Tracks the signed-in identity and its profile, enforces the inactivity
/// timeout and answers permission checks. Exactly one logical instance
/// exists per process; it is constructed at application start and handed
/// to consumers by cloning (handles share the same inner state). State
/// changes are published over a watch channel; sign-out, expiry and
/// redirect requests are signaled as events for the UI and route-guard
/// collaborators to act on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::SignInError;

use super::profile::Profile;
use super::provider::{Credential, Identity, IdentityProvider, ProfileStore};
use super::role::Role;

/// Session behavior knobs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a session survives without user interaction
    pub idle_timeout: Duration,

    /// Routes an anonymous visitor may stay on; leaving a session on any
    /// other route requests a redirect to the login route
    pub public_routes: Vec<String>,

    /// Where unauthorized visitors are sent
    pub login_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            public_routes: vec!["/".to_string(), "/bylaws".to_string()],
            login_route: "/login".to_string(),
        }
    }
}

impl SessionConfig {
    fn is_public(&self, route: &str) -> bool {
        route == self.login_route || self.public_routes.iter().any(|public| public == route)
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No identity
    Anonymous,
    /// Identity present, profile fetch in flight
    Authenticating,
    /// Identity present, profile fetch settled (the profile itself may
    /// still be absent; permission checks then always deny)
    Authenticated,
}

/// Point-in-time view of the session, published on every change
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    /// True during initial bootstrap and while a profile fetch is in flight
    pub loading: bool,
    pub signed_in_at: Option<DateTime<Utc>>,
}

/// Side effects signaled to the UI and route-guard collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session ended by user action or a provider-side sign-out
    SignedOut,
    /// The session ended because the inactivity timeout elapsed;
    /// distinct from [`SessionEvent::SignedOut`] so the UI can say so
    Expired,
    /// The visitor is now anonymous on a non-public route; the route
    /// guard should navigate to the login route and preserve the return
    /// target. The authority never navigates itself.
    RedirectToLogin {
        login_route: String,
        return_to: String,
    },
}

#[derive(Debug, Clone, Copy)]
enum SignOutReason {
    User,
    Provider,
    Expired,
}

struct SessionState {
    identity: Option<Identity>,
    profile: Option<Profile>,
    loading: bool,
    signed_in_at: Option<DateTime<Utc>>,
    /// Bumped on every sign-in and every clear; async completions
    /// (profile fetches, timer expiry) apply only if their epoch is
    /// still current
    epoch: u64,
    current_route: String,
    idle_timer: Option<JoinHandle<()>>,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    snapshot: watch::Sender<SessionSnapshot>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

/// Cheap-to-clone handle to the process-wide session state
#[derive(Clone)]
pub struct SessionAuthority {
    inner: Arc<Inner>,
}

impl SessionAuthority {
    /// Build the authority around the injected collaborators.
    ///
    /// Returns the handle plus the receiving end of the session event
    /// stream. State starts `Anonymous` with `loading` set until the
    /// provider's subscription delivers its first auth event.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (snapshot, _) = watch::channel(SessionSnapshot {
            phase: SessionPhase::Anonymous,
            identity: None,
            profile: None,
            loading: true,
            signed_in_at: None,
        });

        let inner = Arc::new(Inner {
            provider,
            profiles,
            config,
            state: Mutex::new(SessionState {
                identity: None,
                profile: None,
                loading: true,
                signed_in_at: None,
                epoch: 0,
                current_route: "/".to_string(),
                idle_timer: None,
            }),
            snapshot,
            events,
        });

        (Self { inner }, events_rx)
    }

    /// Subscribe to the provider's auth-change stream and keep the
    /// session in step with it. Call once at application start; the
    /// returned handle lives until the provider closes the stream.
    pub fn observe_auth_changes(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let mut changes = inner.provider.subscribe();
        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                match change {
                    Some(identity) => Inner::apply_sign_in(&inner, identity),
                    None => inner.clear_session(SignOutReason::Provider, None),
                }
            }
            debug!("auth-change stream ended");
        })
    }

    /// Watch session snapshots; the route guard holds one of these
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Current snapshot without subscribing
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Record the route the user is currently on; consulted when a
    /// session ends to decide whether to request a login redirect
    pub fn note_route(&self, route: impl Into<String>) {
        self.inner.state.lock().current_route = route.into();
    }

    /// True iff a profile is present and its role ranks at least
    /// `required`. Pure read; safe to call in any state.
    pub fn has_permission(&self, required: Role) -> bool {
        self.inner
            .state
            .lock()
            .profile
            .as_ref()
            .map_or(false, |profile| profile.satisfies(required))
    }

    /// Pass-through to the provider's sign-in. The resulting session
    /// state change arrives via the auth-change subscription, not here.
    pub async fn sign_in(&self, credential: &Credential) -> Result<Identity, SignInError> {
        self.inner.provider.sign_in(credential).await
    }

    /// End the session.
    ///
    /// The provider call is made first; if it fails, the failure is
    /// logged and local state is cleared anyway; local state is
    /// authoritative for the UI, at the cost of a remote session that
    /// may outlive it. Calling while anonymous performs the external
    /// call but changes nothing and fires no events.
    pub async fn sign_out(&self) {
        if let Err(err) = self.inner.provider.sign_out().await {
            warn!(error = %err, "provider sign-out failed, clearing local session anyway");
        }
        self.inner.clear_session(SignOutReason::User, None);
    }

    /// Restart the inactivity countdown. Called by the UI layer on every
    /// user-interaction event (pointer, key, scroll, touch) while a
    /// session is active; rapid calls coalesce into a single pending
    /// timer. A no-op while anonymous.
    pub fn reset_activity_timer(&self) {
        Inner::reset_activity_timer(&self.inner);
    }
}

impl Inner {
    /// Publish the current state over the watch channel
    fn publish(&self) {
        let snapshot = {
            let st = self.state.lock();
            SessionSnapshot {
                phase: match (&st.identity, st.loading) {
                    (None, _) => SessionPhase::Anonymous,
                    (Some(_), true) => SessionPhase::Authenticating,
                    (Some(_), false) => SessionPhase::Authenticated,
                },
                identity: st.identity.clone(),
                profile: st.profile.clone(),
                loading: st.loading,
                signed_in_at: st.signed_in_at,
            }
        };
        self.snapshot.send_replace(snapshot);
    }

    /// Provider reported a signed-in identity: enter `Authenticating`,
    /// start the idle countdown and fetch the profile.
    fn apply_sign_in(inner: &Arc<Self>, identity: Identity) {
        let epoch = {
            let mut st = inner.state.lock();
            st.epoch += 1;
            st.identity = Some(identity.clone());
            st.profile = None;
            st.loading = true;
            st.signed_in_at = Some(Utc::now());
            st.epoch
        };
        debug!(user = %identity.id, "signed in, fetching profile");
        inner.publish();
        Self::reset_activity_timer(inner);

        let fetcher = Arc::clone(inner);
        tokio::spawn(async move {
            let fetched = fetcher.profiles.fetch_profile(&identity.id).await;
            {
                let mut st = fetcher.state.lock();
                if st.epoch != epoch {
                    // The session this fetch belonged to is gone
                    debug!(user = %identity.id, "discarding stale profile fetch");
                    return;
                }
                st.loading = false;
                match fetched {
                    Ok(profile) => st.profile = Some(profile),
                    Err(err) => {
                        warn!(
                            user = %identity.id,
                            error = %err,
                            "profile fetch failed, session continues without a profile"
                        );
                        st.profile = None;
                    }
                }
            }
            fetcher.publish();
        });
    }

    /// The single clearing path, shared by explicit sign-out, the
    /// provider's sign-out event and timer expiry. Idempotent: events
    /// fire only when an active session actually ended. When
    /// `expected_epoch` is given the clear applies only if that session
    /// is still the current one.
    fn clear_session(&self, reason: SignOutReason, expected_epoch: Option<u64>) {
        let (was_active, redirect_from) = {
            let mut st = self.state.lock();
            if expected_epoch.is_some_and(|expected| st.epoch != expected) {
                return;
            }
            let was_active = st.identity.is_some();
            st.epoch += 1;
            st.identity = None;
            st.profile = None;
            st.loading = false;
            st.signed_in_at = None;
            if let Some(timer) = st.idle_timer.take() {
                timer.abort();
            }
            let redirect_from = (was_active && !self.config.is_public(&st.current_route))
                .then(|| st.current_route.clone());
            (was_active, redirect_from)
        };
        self.publish();

        if !was_active {
            return;
        }
        debug!(reason = ?reason, "session cleared");
        let event = match reason {
            SignOutReason::Expired => SessionEvent::Expired,
            SignOutReason::User | SignOutReason::Provider => SessionEvent::SignedOut,
        };
        self.events.send(event).ok();

        if let Some(return_to) = redirect_from {
            self.events
                .send(SessionEvent::RedirectToLogin {
                    login_route: self.config.login_route.clone(),
                    return_to,
                })
                .ok();
        }
    }

    /// Replace (never stack) the pending idle timer
    fn reset_activity_timer(inner: &Arc<Self>) {
        let mut st = inner.state.lock();
        if st.identity.is_none() {
            return;
        }
        if let Some(previous) = st.idle_timer.take() {
            previous.abort();
        }
        let epoch = st.epoch;
        let timeout = inner.config.idle_timeout;
        let expirer = Arc::clone(inner);
        st.idle_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            expirer.expire(epoch).await;
        }));
    }

    /// Idle timeout elapsed. A timer that outlived its session (fired
    /// after sign-out, or aborted too late) is a no-op.
    async fn expire(&self, epoch: u64) {
        {
            let st = self.state.lock();
            if st.identity.is_none() || st.epoch != epoch {
                return;
            }
        }
        debug!("idle timeout reached, signing out");
        if let Err(err) = self.provider.sign_out().await {
            warn!(error = %err, "provider sign-out failed during expiry, clearing local session anyway");
        }
        self.clear_session(SignOutReason::Expired, Some(epoch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProfileFetchError, SignOutError};
    use crate::session::provider::AuthChange;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct MockProvider {
        sender: Mutex<Option<mpsc::UnboundedSender<AuthChange>>>,
        sign_out_calls: AtomicUsize,
        fail_sign_out: AtomicBool,
    }

    impl MockProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sender: Mutex::new(None),
                sign_out_calls: AtomicUsize::new(0),
                fail_sign_out: AtomicBool::new(false),
            })
        }

        fn emit(&self, change: AuthChange) {
            if let Some(tx) = self.sender.lock().as_ref() {
                tx.send(change).ok();
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthChange> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sender.lock() = Some(tx);
            rx
        }

        async fn sign_in(&self, credential: &Credential) -> Result<Identity, SignInError> {
            let identity = Identity {
                id: "u-1".to_string(),
                email: credential.email.clone(),
            };
            self.emit(Some(identity.clone()));
            Ok(identity)
        }

        async fn sign_out(&self) -> Result<(), SignOutError> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out.load(Ordering::SeqCst) {
                return Err(SignOutError("backend unreachable".to_string()));
            }
            // The real backend echoes sign-out through the auth stream
            self.emit(None);
            Ok(())
        }
    }

    struct MockStore {
        profiles: Mutex<HashMap<String, Profile>>,
        gate: Option<Arc<Notify>>,
    }

    impl MockStore {
        fn sample_profile(id: &str, role: &str) -> Profile {
            Profile {
                id: id.to_string(),
                email: format!("{id}@club.example"),
                name: "Pat".to_string(),
                role: role.to_string(),
            }
        }

        fn with_profile(id: &str, role: &str) -> Arc<Self> {
            let mut profiles = HashMap::new();
            profiles.insert(id.to_string(), Self::sample_profile(id, role));
            Arc::new(Self {
                profiles: Mutex::new(profiles),
                gate: None,
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                profiles: Mutex::new(HashMap::new()),
                gate: None,
            })
        }

        fn gated(id: &str, role: &str, gate: Arc<Notify>) -> Arc<Self> {
            let mut profiles = HashMap::new();
            profiles.insert(id.to_string(), Self::sample_profile(id, role));
            Arc::new(Self {
                profiles: Mutex::new(profiles),
                gate: Some(gate),
            })
        }
    }

    #[async_trait]
    impl ProfileStore for MockStore {
        async fn fetch_profile(&self, identity_id: &str) -> Result<Profile, ProfileFetchError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.profiles
                .lock()
                .get(identity_id)
                .cloned()
                .ok_or_else(|| ProfileFetchError::NotFound(identity_id.to_string()))
        }
    }

    struct Harness {
        authority: SessionAuthority,
        provider: Arc<MockProvider>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        snapshots: watch::Receiver<SessionSnapshot>,
    }

    fn harness(store: Arc<MockStore>, config: SessionConfig) -> Harness {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let provider = MockProvider::new();
        let (authority, events) =
            SessionAuthority::new(provider.clone(), store, config);
        let snapshots = authority.watch();
        authority.observe_auth_changes();
        Harness {
            authority,
            provider,
            events,
            snapshots,
        }
    }

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            email: format!("{id}@club.example"),
        }
    }

    async fn wait_for_phase(
        rx: &mut watch::Receiver<SessionSnapshot>,
        phase: SessionPhase,
    ) -> SessionSnapshot {
        loop {
            {
                let current = rx.borrow_and_update();
                if current.phase == phase {
                    return current.clone();
                }
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_bootstrap_resolves_loading() {
        let mut h = harness(MockStore::empty(), SessionConfig::default());
        assert!(h.authority.snapshot().loading);

        h.provider.emit(None);
        settle().await;

        let snapshot = h.authority.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(!snapshot.loading);
        // An anonymous bootstrap is not a sign-out
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sign_in_fetches_profile_and_grants_permissions() {
        let mut h = harness(
            MockStore::with_profile("u-1", "treasurer"),
            SessionConfig::default(),
        );

        h.provider.emit(Some(identity("u-1")));
        let snapshot = wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        assert!(snapshot.profile.is_some());
        assert!(snapshot.signed_in_at.is_some());
        assert!(h.authority.has_permission(Role::Member));
        assert!(h.authority.has_permission(Role::Treasurer));
        assert!(!h.authority.has_permission(Role::Admin));
    }

    #[tokio::test]
    async fn test_sign_in_passthrough_reaches_subscription() {
        let mut h = harness(
            MockStore::with_profile("u-1", "admin"),
            SessionConfig::default(),
        );

        let credential = Credential {
            email: "u-1@club.example".to_string(),
            password: "hunter2".to_string(),
        };
        let identity = h.authority.sign_in(&credential).await.unwrap();
        assert_eq!(identity.email, "u-1@club.example");

        // The session change arrives via the auth stream, not the call
        let snapshot = wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;
        assert_eq!(snapshot.identity, Some(identity));
        assert!(h.authority.has_permission(Role::Admin));
    }

    #[tokio::test]
    async fn test_missing_profile_degrades_session() {
        let mut h = harness(MockStore::empty(), SessionConfig::default());

        h.provider.emit(Some(identity("u-1")));
        let snapshot = wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        // Identity survives the failed fetch, profile does not
        assert!(snapshot.identity.is_some());
        assert!(snapshot.profile.is_none());
        assert!(!h.authority.has_permission(Role::Member));
    }

    #[tokio::test]
    async fn test_stale_profile_fetch_is_discarded() {
        let gate = Arc::new(Notify::new());
        let mut h = harness(
            MockStore::gated("u-1", "admin", gate.clone()),
            SessionConfig::default(),
        );

        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticating).await;
        // No profile yet, so no permissions yet
        assert!(!h.authority.has_permission(Role::Member));

        // Sign out while the fetch is still in flight, then let it finish
        h.provider.emit(None);
        wait_for_phase(&mut h.snapshots, SessionPhase::Anonymous).await;
        gate.notify_one();
        settle().await;

        let snapshot = h.authority.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(snapshot.profile.is_none());
        assert!(!h.authority.has_permission(Role::Member));
    }

    #[tokio::test]
    async fn test_explicit_sign_out_fires_one_event() {
        let mut h = harness(
            MockStore::with_profile("u-1", "member"),
            SessionConfig::default(),
        );
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        h.authority.sign_out().await;
        // The provider echoes the sign-out through the auth stream; the
        // second clearing pass must stay silent
        settle().await;

        assert_eq!(h.events.try_recv(), Ok(SessionEvent::SignedOut));
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.authority.snapshot().phase, SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_out_while_anonymous_is_quiet() {
        let mut h = harness(MockStore::empty(), SessionConfig::default());
        h.provider.emit(None);
        settle().await;

        h.authority.sign_out().await;
        settle().await;

        // External call is still made, but nothing changes locally
        assert_eq!(h.provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_remote_sign_out_failure_still_clears_locally() {
        let mut h = harness(
            MockStore::with_profile("u-1", "member"),
            SessionConfig::default(),
        );
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        h.provider.fail_sign_out.store(true, Ordering::SeqCst);
        h.authority.sign_out().await;

        assert_eq!(h.authority.snapshot().phase, SessionPhase::Anonymous);
        assert_eq!(h.events.try_recv(), Ok(SessionEvent::SignedOut));
    }

    #[tokio::test]
    async fn test_sign_out_on_protected_route_requests_redirect() {
        let mut h = harness(
            MockStore::with_profile("u-1", "member"),
            SessionConfig::default(),
        );
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;
        h.authority.note_route("/ledger");

        // Provider-side sign-out, e.g. revoked from another device
        h.provider.emit(None);
        wait_for_phase(&mut h.snapshots, SessionPhase::Anonymous).await;

        assert_eq!(h.events.try_recv(), Ok(SessionEvent::SignedOut));
        assert_eq!(
            h.events.try_recv(),
            Ok(SessionEvent::RedirectToLogin {
                login_route: "/login".to_string(),
                return_to: "/ledger".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_sign_out_on_public_route_stays_put() {
        let mut h = harness(
            MockStore::with_profile("u-1", "member"),
            SessionConfig::default(),
        );
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;
        h.authority.note_route("/bylaws");

        h.provider.emit(None);
        wait_for_phase(&mut h.snapshots, SessionPhase::Anonymous).await;

        assert_eq!(h.events.try_recv(), Ok(SessionEvent::SignedOut));
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_expires_session() {
        let config = SessionConfig {
            idle_timeout: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let mut h = harness(MockStore::with_profile("u-1", "member"), config);
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        // No activity: the paused clock runs straight into the deadline
        let event = h.events.recv().await;
        assert_eq!(event, Some(SessionEvent::Expired));
        assert_eq!(h.provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.authority.snapshot().phase, SessionPhase::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_resets_coalesce_into_one_timer() {
        let config = SessionConfig {
            idle_timeout: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let mut h = harness(MockStore::with_profile("u-1", "member"), config);
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        // 5 x 40s of elapsed time, each interval ending in activity:
        // well past the timeout in total, never past it since the last
        // interaction
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(40)).await;
            h.authority.reset_activity_timer();
            settle().await;
        }

        assert_eq!(h.authority.snapshot().phase, SessionPhase::Authenticated);
        assert!(h.events.try_recv().is_err());

        // Silence after the last reset lets the countdown finish
        let event = h.events.recv().await;
        assert_eq!(event, Some(SessionEvent::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_is_a_noop_after_sign_out() {
        let config = SessionConfig {
            idle_timeout: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let mut h = harness(MockStore::with_profile("u-1", "member"), config);
        h.provider.emit(Some(identity("u-1")));
        wait_for_phase(&mut h.snapshots, SessionPhase::Authenticated).await;

        h.authority.sign_out().await;
        settle().await;
        assert_eq!(h.events.try_recv(), Ok(SessionEvent::SignedOut));

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;

        assert!(h.events.try_recv().is_err());
        assert_eq!(h.provider.sign_out_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.login_route, "/login");
        assert!(config.is_public("/"));
        assert!(config.is_public("/login"));
        assert!(!config.is_public("/ledger"));
    }

    #[test]
    fn test_config_partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"login_route": "/signin"}"#).unwrap();
        assert_eq!(config.login_route, "/signin");
        assert_eq!(config.idle_timeout, Duration::from_secs(1800));
    }
}
