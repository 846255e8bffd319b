use serde::{Deserialize, Serialize};

use shared_store::StoreError;

/// Storage key for the singleton clinic profile record.
pub const CLINIC_PROFILE_KEY: &str = "clinic_profile";

/// Clinic identity shown on exported documents. A single record,
/// overwritten in place, with no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicProfile {
    pub name: String,
    pub logo: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub registration_number: String,
    pub medical_director: String,
}

impl ClinicProfile {
    /// The hard-coded default the profile can always be restored to.
    pub fn default_profile() -> Self {
        Self {
            name: "Cabinet Médical".to_string(),
            logo: None,
            address: "1 place de la Santé".to_string(),
            phone: "01 00 00 00 00".to_string(),
            email: "contact@cabinet-medical.fr".to_string(),
            registration_number: "N/A".to_string(),
            medical_director: "N/A".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Storage(#[from] StoreError),
}
