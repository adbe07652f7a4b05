use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// PetPals backend base URL, including the /api prefix.
    pub api_base_url: String,
    /// Path of the durable token slot.
    pub token_path: PathBuf,
    /// Identity Toolkit browser API key. Only identity operations need it;
    /// data commands run on the persisted token alone.
    pub identity_api_key: Option<String>,
    /// Override for the Identity Toolkit endpoint (auth emulator support).
    pub identity_auth_url: String,
    /// Override for the secure-token endpoint used to re-mint ID tokens.
    pub identity_token_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: env::var("PETPALS_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/api".into()),
            token_path: env::var("PETPALS_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_token_path()),
            identity_api_key: env::var("FIREBASE_API_KEY").ok().filter(|s| !s.is_empty()),
            identity_auth_url: env::var("FIREBASE_AUTH_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".into()),
            identity_token_url: env::var("FIREBASE_TOKEN_URL")
                .unwrap_or_else(|_| "https://securetoken.googleapis.com/v1".into()),
        })
    }
}

fn default_token_path() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".petpals").join("token"),
        Err(_) => PathBuf::from(".petpals-token"),
    }
}
