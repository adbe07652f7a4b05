use thiserror::Error;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::application::{AdoptionApplication, ApplicationStatus};
use crate::models::pet::{ImageFile, Pet, PetFilter, PetForm};
use crate::models::profile::{UserProfile, UserRole};

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The viewer is not a shelter account.
    #[error("this view is for shelters only")]
    NotShelter,
    /// Shelter account without a shelter linkage; the backend profile is
    /// incomplete and nothing can be loaded for it.
    #[error("shelter profile incomplete: no shelter id")]
    MissingShelterId,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything the shelter dashboard shows at once.
#[derive(Debug)]
pub struct DashboardData {
    pub applications: Vec<AdoptionApplication>,
    pub pets: Vec<Pet>,
}

/// Shelter-side CRUD and application review.
pub struct ShelterDashboard {
    api: ApiClient,
    shelter_id: i64,
}

impl std::fmt::Debug for ShelterDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelterDashboard")
            .field("shelter_id", &self.shelter_id)
            .finish_non_exhaustive()
    }
}

impl ShelterDashboard {
    /// Open the dashboard for a profile. Fails up front for non-shelter
    /// roles and for shelter profiles missing their shelter linkage.
    pub fn open(api: ApiClient, profile: &UserProfile) -> Result<Self, DashboardError> {
        if profile.role != UserRole::Shelter {
            return Err(DashboardError::NotShelter);
        }
        let shelter_id = profile.shelter_id.ok_or(DashboardError::MissingShelterId)?;
        Ok(Self { api, shelter_id })
    }

    pub fn shelter_id(&self) -> i64 {
        self.shelter_id
    }

    /// Incoming applications plus this shelter's own pets.
    pub async fn load(&self) -> Result<DashboardData, DashboardError> {
        let applications = self.api.shelter_applications().await?;
        let pets = self
            .api
            .list_pets(&PetFilter { species: None, shelter_id: Some(self.shelter_id) })
            .await?;
        Ok(DashboardData { applications, pets })
    }

    /// Create a pet owned by this shelter. The form's shelter id is forced
    /// to the dashboard's own; a shelter cannot file pets under another.
    pub async fn add_pet(
        &self,
        mut form: PetForm,
        image: Option<ImageFile>,
    ) -> Result<Pet, DashboardError> {
        form.shelter_id = self.shelter_id;
        Ok(self.api.create_pet(&form, image).await?)
    }

    pub async fn update_pet(
        &self,
        id: i64,
        mut form: PetForm,
        image: Option<ImageFile>,
    ) -> Result<Pet, DashboardError> {
        form.shelter_id = self.shelter_id;
        Ok(self.api.update_pet(id, &form, image).await?)
    }

    pub async fn delete_pet(&self, id: i64) -> Result<(), DashboardError> {
        Ok(self.api.delete_pet(id).await?)
    }

    pub async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<AdoptionApplication, DashboardError> {
        Ok(self.api.update_application_status(id, status).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenStore;

    fn profile(role: UserRole, shelter_id: Option<i64>) -> UserProfile {
        UserProfile {
            user_id: "uid-1".into(),
            email: "s@example.com".into(),
            full_name: "Shelter One".into(),
            role,
            shelter_id,
            preferences: None,
            contact_phone: None,
            address: None,
        }
    }

    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:0/api", TokenStore::in_memory())
    }

    #[test]
    fn open_rejects_adopters() {
        let err = ShelterDashboard::open(api(), &profile(UserRole::Adopter, None)).unwrap_err();
        assert!(matches!(err, DashboardError::NotShelter));
    }

    #[test]
    fn open_rejects_incomplete_shelter_profiles() {
        let err = ShelterDashboard::open(api(), &profile(UserRole::Shelter, None)).unwrap_err();
        assert!(matches!(err, DashboardError::MissingShelterId));
    }

    #[test]
    fn open_accepts_linked_shelters() {
        let dash = ShelterDashboard::open(api(), &profile(UserRole::Shelter, Some(7))).unwrap();
        assert_eq!(dash.shelter_id(), 7);
    }
}
