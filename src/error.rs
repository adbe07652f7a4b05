use thiserror::Error;

/// Identity-layer failures. Raw provider error codes are mapped to these
/// kinds at the provider boundary and never shown to users directly.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("too many attempts")]
    TooManyAttempts,
    #[error("email already in use")]
    EmailInUse,
    #[error("weak password")]
    WeakPassword,
    /// Transport failures and provider codes we do not recognize.
    #[error("identity provider error: {0}")]
    Provider(String),
    /// Backend profile call failed during registration.
    #[error("profile error: {0}")]
    Profile(#[from] ApiError),
}

impl AuthError {
    /// Fixed user-facing message for this error kind. Never reveals which
    /// credential field was wrong.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::TooManyAttempts => "Too many login attempts. Please try again later.",
            AuthError::EmailInUse => "This email is already registered.",
            AuthError::WeakPassword => "Password is too weak.",
            AuthError::Provider(_) => "Something went wrong. Please try again.",
            AuthError::Profile(_) => "Could not set up your profile. Please try again.",
        }
    }
}

/// Backend REST failures, as seen by the HTTP adapter's callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend. The adapter has already cleared the persisted
    /// token when this is returned.
    #[error("unauthorized")]
    Unauthorized,
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Per-field form validation failures, surfaced inline.
#[derive(Debug, Error)]
#[error("validation failed: {}", self.describe())]
pub struct ValidationErrors {
    pub fields: Vec<(&'static str, &'static str)>,
}

impl ValidationErrors {
    fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
