use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Adopter,
    Shelter,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Adopter => "adopter",
            UserRole::Shelter => "shelter",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adopter" => Ok(UserRole::Adopter),
            "shelter" => Ok(UserRole::Shelter),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// Backend-owned profile layered on top of identity-provider authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Identity-provider uid this profile is linked to.
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    /// Set for shelter accounts; links the profile to its shelter record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelter_id: Option<i64>,
    /// Free-form JSON blob, e.g. {"species": "Dog"}.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Preferences {
    #[serde(default)]
    species: Option<String>,
}

impl UserProfile {
    /// Preferred species from the preferences blob, if one is set and parses.
    /// "all" means no preference.
    pub fn preferred_species(&self) -> Option<String> {
        let raw = self.preferences.as_deref()?;
        let prefs: Preferences = serde_json::from_str(raw).ok()?;
        prefs.species.filter(|s| !s.is_empty() && s != "all")
    }
}

/// Payload for `POST /auth/register-profile`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(preferences: Option<&str>) -> UserProfile {
        UserProfile {
            user_id: "uid-1".into(),
            email: "a@example.com".into(),
            full_name: "A".into(),
            role: UserRole::Adopter,
            shelter_id: None,
            preferences: preferences.map(String::from),
            contact_phone: None,
            address: None,
        }
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::Adopter, UserRole::Shelter] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn preferred_species_reads_preferences_blob() {
        assert_eq!(
            profile(Some(r#"{"species": "Dog"}"#)).preferred_species(),
            Some("Dog".to_string())
        );
        assert_eq!(profile(Some(r#"{"species": "all"}"#)).preferred_species(), None);
        assert_eq!(profile(Some("not json")).preferred_species(), None);
        assert_eq!(profile(None).preferred_species(), None);
    }
}
