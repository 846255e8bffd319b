use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Storage key for the consultation collection.
pub const CONSULTATIONS_KEY: &str = "consultations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "professionnel_id")]
    pub professional_id: Uuid,
    pub date: NaiveDate,
    /// Back-reference to the originating appointment, set once at creation
    /// and never re-validated against the appointment's later state.
    #[serde(rename = "lien_rendezvous")]
    pub appointment_link: Option<Uuid>,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsultationRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
}

/// Clinical content of a consultation spawned from an appointment; the
/// patient, professional and date come from the appointment itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalFields {
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConsultationRequest {
    pub date: Option<NaiveDate>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
}

/// Read-only projection joining a consultation to patient and
/// professional names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationWithDetails {
    pub consultation: Consultation,
    pub patient_name: String,
    pub professional_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Consultation not found")]
    NotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error(transparent)]
    Storage(#[from] StoreError),
}
