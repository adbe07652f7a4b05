use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::pet::{Pet, PetFilter, PetSpecies};
use crate::models::profile::{UserProfile, UserRole};

/// Species filter as selected in the listing UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpeciesFilter {
    #[default]
    All,
    Only(PetSpecies),
}

/// Home-page listing and pet detail.
pub struct PetBrowser {
    api: ApiClient,
}

impl PetBrowser {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Browse available pets. When the viewer is an adopter with a stored
    /// species preference and has not picked a filter themselves, the
    /// preference becomes the default filter.
    pub async fn browse(
        &self,
        profile: Option<&UserProfile>,
        selected: SpeciesFilter,
    ) -> Result<Vec<Pet>, ApiError> {
        let species = effective_species(profile, selected);
        self.api.list_pets(&PetFilter { species, shelter_id: None }).await
    }

    pub async fn detail(&self, id: i64) -> Result<Pet, ApiError> {
        self.api.get_pet(id).await
    }
}

fn effective_species(profile: Option<&UserProfile>, selected: SpeciesFilter) -> Option<PetSpecies> {
    match selected {
        SpeciesFilter::Only(species) => Some(species),
        SpeciesFilter::All => profile
            .filter(|p| p.role == UserRole::Adopter)
            .and_then(|p| p.preferred_species())
            .and_then(|s| s.parse().ok()),
    }
}
