use serde::{Deserialize, Serialize};

/// Wire form is capitalized ("Dog"), matching the backend enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PetSpecies {
    Dog,
    Cat,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PetGender {
    Male,
    Female,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl std::fmt::Display for PetSpecies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PetSpecies::Dog => "Dog",
            PetSpecies::Cat => "Cat",
            PetSpecies::Other => "Other",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PetGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PetGender::Male => "Male",
            PetGender::Female => "Female",
            PetGender::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PetSpecies {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dog" => Ok(PetSpecies::Dog),
            "Cat" => Ok(PetSpecies::Cat),
            "Other" => Ok(PetSpecies::Other),
            _ => Err(anyhow::anyhow!("Unknown species: {s}")),
        }
    }
}

impl std::str::FromStr for PetGender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(PetGender::Male),
            "Female" => Ok(PetGender::Female),
            "Unknown" => Ok(PetGender::Unknown),
            _ => Err(anyhow::anyhow!("Unknown gender: {s}")),
        }
    }
}

impl std::str::FromStr for PetStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(PetStatus::Available),
            "pending" => Ok(PetStatus::Pending),
            "adopted" => Ok(PetStatus::Adopted),
            _ => Err(anyhow::anyhow!("Unknown pet status: {s}")),
        }
    }
}

/// Read copy of a backend pet record. Mutated only through explicit
/// create/update/delete calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    /// Free-form text in the backend schema ("2 years", "6 months").
    pub age: String,
    pub species: PetSpecies,
    pub breed: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub temperament: Option<String>,
    #[serde(default)]
    pub medical_needs: Option<String>,
    pub status: PetStatus,
    pub gender: PetGender,
    #[serde(default)]
    pub image_url: Option<String>,
    pub shelter_id: i64,
}

/// Create/update payload. Serialized as JSON when there is no image,
/// flattened into multipart text parts when there is one.
#[derive(Debug, Clone, Serialize)]
pub struct PetForm {
    pub name: String,
    pub age: String,
    pub species: PetSpecies,
    pub breed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_needs: Option<String>,
    pub status: PetStatus,
    pub gender: PetGender,
    pub shelter_id: i64,
}

impl PetForm {
    /// Scalar fields as (name, value) pairs, Nones omitted. The multipart
    /// encoding emits exactly one text part per pair.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("age", self.age.clone()),
            ("species", self.species.to_string()),
            ("breed", self.breed.clone()),
        ];
        if let Some(d) = &self.description {
            fields.push(("description", d.clone()));
        }
        if let Some(t) = &self.temperament {
            fields.push(("temperament", t.clone()));
        }
        if let Some(m) = &self.medical_needs {
            fields.push(("medical_needs", m.clone()));
        }
        fields.push(("status", self.status.to_string()));
        fields.push(("gender", self.gender.to_string()));
        fields.push(("shelter_id", self.shelter_id.to_string()));
        fields
    }
}

/// An image attachment for a pet create/update request.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Optional filters for `GET /pets`.
#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    pub species: Option<PetSpecies>,
    pub shelter_id: Option<i64>,
}
