#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::mpsc;

use petpals::error::AuthError;
use petpals::identity::{AuthChange, AuthUser, IdentityProvider};
use petpals::models::profile::{UserProfile, UserRole};

/// Bind a throwaway local server for the adapter to talk to.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

pub fn user(name: &str) -> AuthUser {
    AuthUser { uid: format!("uid-{name}"), email: format!("{name}@example.com") }
}

pub fn profile(uid: &str, role: UserRole) -> UserProfile {
    UserProfile {
        user_id: uid.to_string(),
        email: format!("{uid}@example.com"),
        full_name: format!("User {uid}"),
        role,
        shelter_id: (role == UserRole::Shelter).then_some(1),
        preferences: None,
        contact_phone: None,
        address: None,
    }
}

/// Scriptable identity backend. Tokens are deterministic (`tok-<uid>`),
/// change events can be injected directly with `emit`, and sign-out can be
/// made to fail for the fail-open logout test. Like the real provider,
/// `subscribe` delivers the current state as its first event.
pub struct StubIdentity {
    accounts: Mutex<HashMap<String, String>>,
    current: Mutex<AuthChange>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthChange>>>,
    pub fail_sign_out: AtomicBool,
}

impl StubIdentity {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), password.to_string());
        self
    }

    /// Inject an auth-state change as if the provider observed it.
    pub fn emit(&self, change: AuthChange) {
        *self.current.lock().unwrap() = change.clone();
        let mut subs = self.subscribers.lock().unwrap();
        subs.retain(|tx| tx.send(change.clone()).is_ok());
    }

    fn user_for(email: &str) -> AuthUser {
        let name = email.split('@').next().unwrap_or(email);
        user(name)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let ok = self.accounts.lock().unwrap().get(email).map(String::as_str) == Some(password);
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }
        let user = Self::user_for(email);
        self.emit(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        accounts.insert(email.to_string(), password.to_string());
        // No change event: the session applies registration state itself.
        Ok(Self::user_for(email))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("sign-out unavailable".into()));
        }
        self.emit(None);
        Ok(())
    }

    async fn mint_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        Ok(format!("tok-{}", user.uid))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.current.lock().unwrap().clone());
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// Backend profile endpoints with per-token response delays and call
/// counters, enough to script the staleness and fetch-count properties.
#[derive(Clone, Default)]
pub struct ProfileServerState {
    profiles: Arc<Mutex<HashMap<String, (u64, UserProfile)>>>,
    pub fetch_count: Arc<AtomicUsize>,
    pub register_count: Arc<AtomicUsize>,
}

impl ProfileServerState {
    /// Serve `profile` for requests bearing `token`, after `delay_ms`.
    pub fn insert_profile(&self, token: &str, delay_ms: u64, profile: UserProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(token.to_string(), (delay_ms, profile));
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn registers(&self) -> usize {
        self.register_count.load(Ordering::SeqCst)
    }
}

pub fn profile_router(state: ProfileServerState) -> Router {
    Router::new()
        .route("/auth/profile", get(get_profile))
        .route("/auth/register-profile", post(register_profile))
        .with_state(state)
}

pub fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}

async fn get_profile(
    State(state): State<ProfileServerState>,
    headers: HeaderMap,
) -> Response {
    state.fetch_count.fetch_add(1, Ordering::SeqCst);
    let entry = bearer(&headers).and_then(|t| state.profiles.lock().unwrap().get(&t).cloned());
    match entry {
        Some((delay_ms, profile)) => {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Json(profile).into_response()
        }
        // 404, not 401: these tests exercise the profile-missing path, not
        // the adapter's token-clearing side effect.
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({"detail": "no profile"})))
            .into_response(),
    }
}

#[derive(serde::Deserialize)]
struct RegisterBody {
    uid: String,
    email: String,
    name: String,
    role: UserRole,
}

async fn register_profile(
    State(state): State<ProfileServerState>,
    Json(body): Json<RegisterBody>,
) -> Json<UserProfile> {
    state.register_count.fetch_add(1, Ordering::SeqCst);
    Json(UserProfile {
        user_id: body.uid,
        email: body.email,
        full_name: body.name,
        role: body.role,
        shelter_id: (body.role == UserRole::Shelter).then_some(1),
        preferences: None,
        contact_phone: None,
        address: None,
    })
}
