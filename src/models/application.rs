use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(anyhow::anyhow!("Unknown application status: {s}")),
        }
    }
}

/// Backend-owned adoption request. Created by an adopter, transitioned only
/// by the owning shelter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdoptionApplication {
    pub id: i64,
    pub pet_id: i64,
    /// Identity-provider uid of the applicant.
    pub user_id: String,
    pub shelter_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub living_situation: Option<String>,
    #[serde(default)]
    pub previous_pet_experience: Option<String>,
    pub why_adopt: String,
    #[serde(default)]
    pub home_description: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /applications`.
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub pet_id: i64,
    pub user_id: String,
    pub shelter_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub living_situation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_pet_experience: Option<String>,
    pub why_adopt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_description: Option<String>,
}

/// Body of `PUT /applications/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
}
