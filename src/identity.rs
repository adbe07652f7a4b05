use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::AuthError;

/// Opaque identity-provider user handle: a stable id plus email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// One auth-state change notification: `Some` on sign-in or external token
/// refresh, `None` on sign-out.
pub type AuthChange = Option<AuthUser>;

/// Identity backend seam. `sign_in` and `sign_out` emit change notifications
/// on every subscribed stream; `sign_up` deliberately does not — the session
/// layer applies registration state itself so the create-profile response is
/// used directly instead of a second profile fetch.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    /// Mint a fresh short-lived bearer token for the given user.
    async fn mint_token(&self, user: &AuthUser) -> Result<String, AuthError>;
    /// Subscribe to auth-state changes. The provider's current state is
    /// delivered as the first event, so a fresh subscriber always resolves
    /// out of its initial loading state; later events arrive in the order
    /// the provider observed them.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthChange>;
}

/// Firebase Identity Toolkit REST client.
pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    auth_url: String,
    token_url: String,
    state: Mutex<Option<ProviderSession>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthChange>>>,
}

#[derive(Debug, Clone)]
struct ProviderSession {
    user: AuthUser,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "id_token")]
    id_token: String,
    #[serde(rename = "refresh_token")]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: &str, auth_url: &str, token_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            token_url: token_url.trim_end_matches('/').to_string(),
            state: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn notify(&self, change: AuthChange) {
        let mut subs = self.subscribers.lock().expect("subscriber list poisoned");
        subs.retain(|tx| tx.send(change.clone()).is_ok());
    }

    fn store(&self, session: ProviderSession) {
        *self.state.lock().expect("provider state poisoned") = Some(session);
    }

    /// Map an Identity Toolkit error code to our taxonomy. The raw code is
    /// logged but never surfaced.
    fn map_error(code: &str) -> AuthError {
        debug!("identity provider error code: {code}");
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            c if c.starts_with("TOO_MANY_ATTEMPTS") => AuthError::TooManyAttempts,
            c if c.starts_with("WEAK_PASSWORD") => AuthError::WeakPassword,
            c => AuthError::Provider(c.to_string()),
        }
    }

    async fn credential_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<SignInResponse, AuthError> {
        let url = format!("{}/accounts:{endpoint}?key={}", self.auth_url, self.api_key);
        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if resp.status().is_success() {
            resp.json::<SignInResponse>()
                .await
                .map_err(|e| AuthError::Provider(e.to_string()))
        } else {
            let err = resp
                .json::<ProviderError>()
                .await
                .map_err(|e| AuthError::Provider(e.to_string()))?;
            Err(Self::map_error(&err.error.message))
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let resp = self.credential_call("signInWithPassword", email, password).await?;
        let user = AuthUser { uid: resp.local_id, email: resp.email };
        self.store(ProviderSession {
            user: user.clone(),
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
        });
        self.notify(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let resp = self.credential_call("signUp", email, password).await?;
        let user = AuthUser { uid: resp.local_id, email: resp.email };
        self.store(ProviderSession {
            user: user.clone(),
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
        });
        // No notification: the session applies registration state itself.
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.state.lock().expect("provider state poisoned") = None;
        self.notify(None);
        Ok(())
    }

    async fn mint_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let session = self
            .state
            .lock()
            .expect("provider state poisoned")
            .clone()
            .filter(|s| s.user.uid == user.uid)
            .ok_or_else(|| AuthError::Provider("no provider session".into()))?;

        // Exchange the refresh token for a fresh ID token. Falls back to the
        // last ID token if the exchange fails; a stale token will surface as
        // a 401 on the next backend call.
        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let exchanged = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.as_str()),
            ])
            .send()
            .await;

        match exchanged {
            Ok(resp) if resp.status().is_success() => {
                let fresh: RefreshResponse = resp
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                self.store(ProviderSession {
                    user: session.user,
                    id_token: fresh.id_token.clone(),
                    refresh_token: fresh.refresh_token,
                });
                Ok(fresh.id_token)
            }
            Ok(resp) => {
                debug!("token exchange returned {}", resp.status());
                Ok(session.id_token)
            }
            Err(e) => {
                debug!("token exchange failed: {e}");
                Ok(session.id_token)
            }
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        // First event is the current state: `None` when nobody is signed
        // in, so an anonymous visitor's session leaves Initializing too.
        let current = self
            .state
            .lock()
            .expect("provider state poisoned")
            .as_ref()
            .map(|s| s.user.clone());
        let _ = tx.send(current);
        self.subscribers
            .lock()
            .expect("subscriber list poisoned")
            .push(tx);
        rx
    }
}
