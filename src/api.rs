use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::models::application::{
    AdoptionApplication, ApplicationStatus, NewApplication, StatusChange,
};
use crate::models::pet::{ImageFile, Pet, PetFilter, PetForm};
use crate::models::profile::{NewProfile, UserProfile};
use crate::token::TokenStore;

/// Error body shape the backend uses; either field may carry the message.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Uniform outbound request shaping for the PetPals backend.
///
/// The persisted token is read fresh from the [`TokenStore`] on every
/// request. A 401 clears that slot as a side effect but never touches
/// session state — the session provider reacts on its own change stream,
/// so there is exactly one owner of session transitions.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: TokenStore) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{path}", self.base_url));
        // Fresh read on every request; no caching across calls.
        if let Some(token) = self.tokens.get() {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn check(&self, resp: Response) -> Result<Response, ApiError> {
        if resp.status() == StatusCode::UNAUTHORIZED {
            // Defense in depth against a stale or revoked token. The session
            // provider is deliberately left alone here.
            warn!("backend rejected credentials; clearing persisted token");
            self.tokens.clear();
            return Err(ApiError::Unauthorized);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.detail.or(body.message).unwrap_or_default(),
                Err(_) => String::new(),
            };
            return Err(ApiError::Status { status, message });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(Method::GET, path).send().await?;
        Ok(self.check(resp).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.request(method, path).json(body).send().await?;
        Ok(self.check(resp).await?.json().await?)
    }

    /// Multipart body for a pet create/update with an attached image: one
    /// text part per present scalar field plus one `image` file part.
    fn pet_multipart(form: &PetForm, image: ImageFile) -> Result<Form, ApiError> {
        let mut multipart = Form::new();
        for (name, value) in form.text_fields() {
            multipart = multipart.text(name, value);
        }
        let content_type = image.content_type();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&content_type)
            .map_err(ApiError::Transport)?;
        Ok(multipart.part("image", part))
    }

    // --- Profile ---

    pub async fn register_profile(&self, profile: &NewProfile) -> Result<UserProfile, ApiError> {
        self.send_json(Method::POST, "/auth/register-profile", profile).await
    }

    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/profile").await
    }

    // --- Pets ---

    pub async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(species) = filter.species {
            query.push(("species", species.to_string()));
        }
        if let Some(shelter_id) = filter.shelter_id {
            query.push(("shelterId", shelter_id.to_string()));
        }
        let resp = self.request(Method::GET, "/pets").query(&query).send().await?;
        Ok(self.check(resp).await?.json().await?)
    }

    pub async fn get_pet(&self, id: i64) -> Result<Pet, ApiError> {
        self.get_json(&format!("/pets/{id}")).await
    }

    pub async fn create_pet(
        &self,
        form: &PetForm,
        image: Option<ImageFile>,
    ) -> Result<Pet, ApiError> {
        self.send_pet(Method::POST, "/pets", form, image).await
    }

    pub async fn update_pet(
        &self,
        id: i64,
        form: &PetForm,
        image: Option<ImageFile>,
    ) -> Result<Pet, ApiError> {
        self.send_pet(Method::PUT, &format!("/pets/{id}"), form, image).await
    }

    async fn send_pet(
        &self,
        method: Method,
        path: &str,
        form: &PetForm,
        image: Option<ImageFile>,
    ) -> Result<Pet, ApiError> {
        let req = self.request(method, path);
        let resp = match image {
            Some(image) => req.multipart(Self::pet_multipart(form, image)?).send().await?,
            None => req.json(form).send().await?,
        };
        Ok(self.check(resp).await?.json().await?)
    }

    pub async fn delete_pet(&self, id: i64) -> Result<(), ApiError> {
        let resp = self.request(Method::DELETE, &format!("/pets/{id}")).send().await?;
        self.check(resp).await?;
        Ok(())
    }

    // --- Applications ---

    pub async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<AdoptionApplication, ApiError> {
        self.send_json(Method::POST, "/applications", application).await
    }

    pub async fn my_applications(&self) -> Result<Vec<AdoptionApplication>, ApiError> {
        self.get_json("/applications/my").await
    }

    pub async fn shelter_applications(&self) -> Result<Vec<AdoptionApplication>, ApiError> {
        self.get_json("/applications/shelter").await
    }

    pub async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<AdoptionApplication, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/applications/{id}/status"),
            &StatusChange { status },
        )
        .await
    }
}
