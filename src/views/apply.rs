use crate::api::ApiClient;
use crate::error::{ApiError, ValidationErrors};
use crate::identity::AuthUser;
use crate::models::application::{AdoptionApplication, NewApplication};
use crate::models::pet::Pet;
use crate::models::profile::UserProfile;

/// Adoption application form state. Prefilled from the session where
/// possible, validated inline, submitted against the pet being applied for.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub living_situation: String,
    pub previous_pet_experience: String,
    pub why_adopt: String,
    pub home_description: String,
}

impl ApplicationForm {
    /// Prefill name and email from the authenticated user and their profile.
    pub fn prefilled(user: &AuthUser, profile: Option<&UserProfile>) -> Self {
        Self {
            full_name: profile.map(|p| p.full_name.clone()).unwrap_or_default(),
            email: user.email.clone(),
            ..Self::default()
        }
    }

    /// Required fields per the backend schema: full name, a plausible email,
    /// phone, address, and the adoption reason. Optional narrative fields
    /// may stay empty.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut fields = Vec::new();
        if self.full_name.trim().is_empty() {
            fields.push(("full_name", "Full name is required."));
        }
        if !looks_like_email(&self.email) {
            fields.push(("email", "A valid email address is required."));
        }
        if self.phone.trim().is_empty() {
            fields.push(("phone", "Phone number is required."));
        }
        if self.address.trim().is_empty() {
            fields.push(("address", "Address is required."));
        }
        if self.why_adopt.trim().is_empty() {
            fields.push(("why_adopt", "Please tell us why you want to adopt."));
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { fields })
        }
    }

    /// Build the submission payload. The shelter linkage comes from the pet
    /// record, the applicant id from the authenticated user.
    pub fn to_application(&self, user: &AuthUser, pet: &Pet) -> NewApplication {
        NewApplication {
            pet_id: pet.id,
            user_id: user.uid.clone(),
            shelter_id: pet.shelter_id,
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            living_situation: optional(&self.living_situation),
            previous_pet_experience: optional(&self.previous_pet_experience),
            why_adopt: self.why_adopt.trim().to_string(),
            home_description: optional(&self.home_description),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Validate and submit in one step; validation failures never reach the wire.
pub async fn submit(
    api: &ApiClient,
    form: &ApplicationForm,
    user: &AuthUser,
    pet: &Pet,
) -> Result<AdoptionApplication, SubmitError> {
    form.validate()?;
    Ok(api.submit_application(&form.to_application(user, pet)).await?)
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pet::{PetGender, PetSpecies, PetStatus};

    fn filled_form() -> ApplicationForm {
        ApplicationForm {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Analytical Way".into(),
            living_situation: String::new(),
            previous_pet_experience: "Two cats".into(),
            why_adopt: "Companionship".into(),
            home_description: String::new(),
        }
    }

    fn pet() -> Pet {
        Pet {
            id: 42,
            name: "Rex".into(),
            age: "2 years".into(),
            species: PetSpecies::Dog,
            breed: "Mix".into(),
            description: None,
            temperament: None,
            medical_needs: None,
            status: PetStatus::Available,
            gender: PetGender::Male,
            image_url: None,
            shelter_id: 7,
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(filled_form().validate().is_ok());
    }

    #[test]
    fn missing_required_fields_are_reported_per_field() {
        let form = ApplicationForm { email: "not-an-email".into(), ..Default::default() };
        let err = form.validate().unwrap_err();
        let names: Vec<_> = err.fields.iter().map(|(f, _)| *f).collect();
        assert_eq!(names, vec!["full_name", "email", "phone", "address", "why_adopt"]);
    }

    #[test]
    fn payload_links_applicant_and_shelter() {
        let user = AuthUser { uid: "uid-9".into(), email: "ada@example.com".into() };
        let app = filled_form().to_application(&user, &pet());
        assert_eq!(app.pet_id, 42);
        assert_eq!(app.shelter_id, 7);
        assert_eq!(app.user_id, "uid-9");
        assert_eq!(app.living_situation, None);
        assert_eq!(app.previous_pet_experience.as_deref(), Some("Two cats"));
    }

    #[test]
    fn prefill_uses_profile_name_and_account_email() {
        let user = AuthUser { uid: "uid-9".into(), email: "ada@example.com".into() };
        let form = ApplicationForm::prefilled(&user, None);
        assert_eq!(form.email, "ada@example.com");
        assert_eq!(form.full_name, "");
    }
}
