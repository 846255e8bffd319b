use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Storage keys for the issued-document collections.
pub const PRESCRIPTIONS_KEY: &str = "prescriptions";
pub const CERTIFICATES_KEY: &str = "certificates";

// ==============================================================================
// PRESCRIPTIONS
// ==============================================================================

/// One medication line. Free text throughout; no unit validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "professionnel_id")]
    pub professional_id: Uuid,
    pub consultation_id: Option<Uuid>,
    pub issued_on: NaiveDate,
    pub medications: Vec<Medication>,
    pub instructions: String,
    pub signature: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub consultation_id: Option<Uuid>,
    pub issued_on: NaiveDate,
    pub medications: Vec<Medication>,
    pub instructions: String,
    pub signature: String,
}

/// Content of a prescription issued from a consultation; patient and
/// professional are copied forward from the consultation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionFields {
    pub issued_on: NaiveDate,
    pub medications: Vec<Medication>,
    pub instructions: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub issued_on: Option<NaiveDate>,
    pub medications: Option<Vec<Medication>>,
    pub instructions: Option<String>,
    pub signature: Option<String>,
}

// ==============================================================================
// CERTIFICATES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    Repos,
    Aptitude,
    Grossesse,
    Sport,
    Maladie,
    Accident,
    Autre,
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateKind::Repos => write!(f, "repos"),
            CertificateKind::Aptitude => write!(f, "aptitude"),
            CertificateKind::Grossesse => write!(f, "grossesse"),
            CertificateKind::Sport => write!(f, "sport"),
            CertificateKind::Maladie => write!(f, "maladie"),
            CertificateKind::Accident => write!(f, "accident"),
            CertificateKind::Autre => write!(f, "autre"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "professionnel_id")]
    pub professional_id: Uuid,
    pub consultation_id: Option<Uuid>,
    pub issued_on: NaiveDate,
    pub kind: CertificateKind,
    /// Required (and positive) when `kind` is `Repos`.
    pub rest_days: Option<u32>,
    pub commentary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCertificateRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub consultation_id: Option<Uuid>,
    pub issued_on: NaiveDate,
    pub kind: CertificateKind,
    pub rest_days: Option<u32>,
    pub commentary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateFields {
    pub issued_on: NaiveDate,
    pub kind: CertificateKind,
    pub rest_days: Option<u32>,
    pub commentary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCertificateRequest {
    pub issued_on: Option<NaiveDate>,
    pub kind: Option<CertificateKind>,
    pub rest_days: Option<u32>,
    pub commentary: Option<String>,
}

// ==============================================================================
// EXPORT
// ==============================================================================

/// Rendered plain-text document, ready to hand to whatever surface saves
/// or displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentExport {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

pub const EXPORT_MIME: &str = "text/plain";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document not found")]
    NotFound,

    #[error("Consultation not found")]
    ConsultationNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
