use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::AuthError;
use crate::identity::{AuthChange, AuthUser, IdentityProvider};
use crate::models::profile::{NewProfile, UserProfile, UserRole};
use crate::token::TokenStore;

/// Bounded retry for the background profile fetch. The session never loops
/// forever: after the budget it stays authenticated with profile unknown.
const PROFILE_FETCH_ATTEMPTS: u32 = 3;
const PROFILE_RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Initial auth check still pending; protected content must not render.
    Initializing,
    Authenticated,
    Anonymous,
}

/// The client's current belief about who is authenticated. Replaced wholesale
/// on every auth-state change; `generation` increases monotonically with each
/// replacement and is used to discard stale async profile results.
///
/// Invariant, enforced by the constructors: `status == Authenticated` exactly
/// when `auth_user` is present. `profile` may be `None` while authenticated
/// (fetch pending or failed) — an observable intermediate state, not an error.
#[derive(Debug, Clone)]
pub struct SessionState {
    generation: u64,
    status: SessionStatus,
    auth_user: Option<AuthUser>,
    profile: Option<UserProfile>,
}

impl SessionState {
    fn initializing() -> Self {
        Self { generation: 0, status: SessionStatus::Initializing, auth_user: None, profile: None }
    }

    fn authenticated(generation: u64, user: AuthUser) -> Self {
        Self {
            generation,
            status: SessionStatus::Authenticated,
            auth_user: Some(user),
            profile: None,
        }
    }

    fn anonymous(generation: u64) -> Self {
        Self { generation, status: SessionStatus::Anonymous, auth_user: None, profile: None }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn auth_user(&self) -> Option<&AuthUser> {
        self.auth_user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }
}

/// Process-wide source of truth for "who is logged in and what can they do".
///
/// One background task consumes the identity provider's change stream in
/// order, one event at a time. Profile fetches run concurrently but are
/// tagged with the generation they belong to and dropped when superseded.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    identity: Arc<dyn IdentityProvider>,
    api: ApiClient,
    tokens: TokenStore,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Subscribe to the identity backend and start the session task.
    pub fn start(identity: Arc<dyn IdentityProvider>, api: ApiClient, tokens: TokenStore) -> Self {
        let events = identity.subscribe();
        let (state, _) = watch::channel(SessionState::initializing());
        let inner = Arc::new(SessionInner { identity, api, tokens, state });

        tokio::spawn(run_event_loop(inner.clone(), events));

        Self { inner }
    }

    /// Watch the session state. Guards and views re-read on every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Authenticate against the identity backend. State, token, and profile
    /// are applied by the change-stream handler the sign-in triggers.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.inner.identity.sign_in(email, password).await?;
        Ok(())
    }

    /// Create an identity account and the backend profile. The profile comes
    /// straight from the create-profile response — no follow-up fetch, so
    /// there is no read-after-write race against the backend.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> Result<(), AuthError> {
        let user = self.inner.identity.sign_up(email, password).await?;
        let token = self.inner.identity.mint_token(&user).await?;
        self.inner.tokens.set(&token);
        let generation = self
            .inner
            .replace(|generation| SessionState::authenticated(generation, user.clone()));

        let profile = self
            .inner
            .api
            .register_profile(&NewProfile {
                uid: user.uid.clone(),
                email: user.email.clone(),
                name: name.to_string(),
                role,
            })
            .await?;
        self.inner.apply_profile(generation, profile);
        Ok(())
    }

    /// Fail-open logout: the local session is cleared before the provider
    /// call, so the client ends up anonymous whatever the backend says.
    pub async fn logout(&self) {
        self.inner.tokens.clear();
        self.inner.replace(SessionState::anonymous);
        if let Err(e) = self.inner.identity.sign_out().await {
            warn!("provider sign-out failed ({e}); local session already cleared");
        }
    }

    /// Wait until the session has a profile or the timeout passes. Returns
    /// the profile if one arrived in time.
    pub async fn wait_for_profile(&self, timeout: Duration) -> Option<UserProfile> {
        let mut rx = self.subscribe();
        let wait = async {
            loop {
                {
                    let state = rx.borrow_and_update();
                    if let Some(profile) = state.profile() {
                        return Some(profile.clone());
                    }
                }
                if rx.changed().await.is_err() {
                    return None;
                }
            }
        };
        tokio::time::timeout(timeout, wait).await.ok().flatten()
    }
}

impl SessionInner {
    /// Replace the state wholesale under the watch lock, bumping the
    /// generation. Returns the new generation.
    fn replace(&self, make: impl FnOnce(u64) -> SessionState) -> u64 {
        let mut generation = 0;
        let mut make = Some(make);
        self.state.send_modify(|state| {
            generation = state.generation + 1;
            let make = make.take().expect("send_modify ran twice");
            *state = make(generation);
        });
        generation
    }

    /// Attach a fetched profile if the session it belongs to is still the
    /// current one; otherwise drop it.
    fn apply_profile(&self, generation: u64, profile: UserProfile) -> bool {
        let mut slot = Some(profile);
        self.state.send_if_modified(|state| {
            if state.generation == generation && state.auth_user.is_some() {
                state.profile = slot.take();
                true
            } else {
                false
            }
        })
    }

    async fn handle_change(self: &Arc<Self>, change: AuthChange) {
        match change {
            Some(user) => {
                // Persist the token before the profile fetch is issued: the
                // adapter reads the slot at call time.
                match self.identity.mint_token(&user).await {
                    Ok(token) => self.tokens.set(&token),
                    Err(e) => {
                        warn!("token mint failed for {}: {e}", user.uid);
                        self.tokens.clear();
                    }
                }
                info!("auth state: user present ({})", user.uid);
                let generation = self
                    .replace(|generation| SessionState::authenticated(generation, user.clone()));
                self.spawn_profile_fetch(generation);
            }
            None => {
                info!("auth state: user absent");
                self.tokens.clear();
                self.replace(SessionState::anonymous);
            }
        }
    }

    fn spawn_profile_fetch(self: &Arc<Self>, generation: u64) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            for attempt in 1..=PROFILE_FETCH_ATTEMPTS {
                // A newer session supersedes this fetch entirely.
                if inner.state.borrow().generation != generation {
                    return;
                }
                match inner.api.get_profile().await {
                    Ok(profile) => {
                        if !inner.apply_profile(generation, profile) {
                            info!("dropping stale profile result for generation {generation}");
                        }
                        return;
                    }
                    Err(e) => {
                        warn!("profile fetch attempt {attempt} failed: {e}");
                        if attempt < PROFILE_FETCH_ATTEMPTS {
                            tokio::time::sleep(PROFILE_RETRY_BACKOFF * attempt).await;
                        }
                    }
                }
            }
            // Budget exhausted: stay authenticated with profile unknown.
            // The route guard shows a loading state for this, not an error.
            warn!("profile unavailable after {PROFILE_FETCH_ATTEMPTS} attempts");
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn initializing() -> SessionState {
        SessionState::initializing()
    }

    pub fn anonymous() -> SessionState {
        SessionState::anonymous(1)
    }

    pub fn authenticated(uid: &str, role: Option<UserRole>) -> SessionState {
        let user = AuthUser { uid: uid.to_string(), email: format!("{uid}@example.com") };
        let mut state = SessionState::authenticated(1, user);
        state.profile = role.map(|role| UserProfile {
            user_id: uid.to_string(),
            email: format!("{uid}@example.com"),
            full_name: "Test User".to_string(),
            role,
            shelter_id: (role == UserRole::Shelter).then_some(1),
            preferences: None,
            contact_phone: None,
            address: None,
        });
        state
    }
}

async fn run_event_loop(
    inner: Arc<SessionInner>,
    mut events: mpsc::UnboundedReceiver<AuthChange>,
) {
    // One change at a time, in delivery order. Profile fetches overlap but
    // are generation-guarded.
    while let Some(change) = events.recv().await {
        inner.handle_change(change).await;
    }
}
