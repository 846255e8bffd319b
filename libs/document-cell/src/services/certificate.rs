use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{UNKNOWN_PATIENT, UNKNOWN_PROFESSIONAL};
use auth_cell::models::{User, USERS_KEY};
use consultation_cell::models::{Consultation, CONSULTATIONS_KEY};
use patient_cell::models::{Patient, PATIENTS_KEY};
use profile_cell::ClinicProfileService;
use shared_store::{Collection, LocalStore};

use crate::models::{
    Certificate, CertificateFields, CertificateKind, CreateCertificateRequest, DocumentError,
    DocumentExport, UpdateCertificateRequest, CERTIFICATES_KEY, EXPORT_MIME,
};
use crate::services::render;

pub struct CertificateService {
    certificates: Collection<Certificate>,
    consultations: Collection<Consultation>,
    patients: Collection<Patient>,
    users: Collection<User>,
    profile: ClinicProfileService,
}

impl CertificateService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            certificates: Collection::new(Arc::clone(&store), CERTIFICATES_KEY),
            consultations: Collection::new(Arc::clone(&store), CONSULTATIONS_KEY),
            patients: Collection::new(Arc::clone(&store), PATIENTS_KEY),
            users: Collection::new(Arc::clone(&store), USERS_KEY),
            profile: ClinicProfileService::new(store),
        }
    }

    fn load(&self) -> Result<Vec<Certificate>, DocumentError> {
        Ok(self.certificates.load_or_seed(Vec::new)?)
    }

    pub fn create(&self, request: CreateCertificateRequest) -> Result<Certificate, DocumentError> {
        validate_rest_days(request.kind, request.rest_days)?;

        self.insert(Certificate {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            professional_id: request.professional_id,
            consultation_id: request.consultation_id,
            issued_on: request.issued_on,
            kind: request.kind,
            rest_days: request.rest_days,
            commentary: request.commentary,
            created_at: Utc::now(),
        })
    }

    /// Issue a certificate from a consultation: patient and professional
    /// are copied forward and the consultation link is stamped.
    pub fn create_from_consultation(
        &self,
        consultation_id: Uuid,
        fields: CertificateFields,
    ) -> Result<Certificate, DocumentError> {
        validate_rest_days(fields.kind, fields.rest_days)?;

        let consultation = self
            .consultations
            .try_load()?
            .unwrap_or_default()
            .into_iter()
            .find(|c| c.id == consultation_id)
            .ok_or(DocumentError::ConsultationNotFound)?;

        self.insert(Certificate {
            id: Uuid::new_v4(),
            patient_id: consultation.patient_id,
            professional_id: consultation.professional_id,
            consultation_id: Some(consultation.id),
            issued_on: fields.issued_on,
            kind: fields.kind,
            rest_days: fields.rest_days,
            commentary: fields.commentary,
            created_at: Utc::now(),
        })
    }

    fn insert(&self, certificate: Certificate) -> Result<Certificate, DocumentError> {
        info!(
            "Issued {} certificate {} for patient {}",
            certificate.kind, certificate.id, certificate.patient_id
        );
        let mut certificates = self.load()?;
        certificates.push(certificate.clone());
        self.certificates.save_all(&certificates)?;
        Ok(certificate)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Certificate>, DocumentError> {
        Ok(self.load()?.into_iter().find(|c| c.id == id))
    }

    pub fn list(&self) -> Result<Vec<Certificate>, DocumentError> {
        self.load()
    }

    pub fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Certificate>, DocumentError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|c| c.patient_id == patient_id)
            .collect())
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdateCertificateRequest,
    ) -> Result<Certificate, DocumentError> {
        let mut certificates = self.load()?;
        let certificate = certificates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DocumentError::NotFound)?;

        // Validate against the merged state, not the request alone.
        let kind = request.kind.unwrap_or(certificate.kind);
        let rest_days = request.rest_days.or(certificate.rest_days);
        validate_rest_days(kind, rest_days)?;

        certificate.kind = kind;
        certificate.rest_days = rest_days;
        if let Some(issued_on) = request.issued_on {
            certificate.issued_on = issued_on;
        }
        if let Some(commentary) = request.commentary {
            certificate.commentary = commentary;
        }

        let updated = certificate.clone();
        debug!("Updated certificate {}", id);
        self.certificates.save_all(&certificates)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, DocumentError> {
        let mut certificates = self.load()?;
        let before = certificates.len();
        certificates.retain(|c| c.id != id);

        if certificates.len() == before {
            return Ok(false);
        }

        info!("Deleted certificate {}", id);
        self.certificates.save_all(&certificates)?;
        Ok(true)
    }

    /// Render the certificate as a fixed-layout plain-text document.
    pub fn export(&self, id: Uuid) -> Result<DocumentExport, DocumentError> {
        let certificate = self.get(id)?.ok_or(DocumentError::NotFound)?;
        let profile = self.profile.get().map_err(|e| match e {
            profile_cell::ProfileError::Storage(err) => DocumentError::Storage(err),
        })?;

        let (patient_name, professional_name) =
            self.resolve_names(certificate.patient_id, certificate.professional_id)?;

        let content =
            render::render_certificate(&profile, &certificate, &patient_name, &professional_name);

        Ok(DocumentExport {
            filename: format!("certificat_{}.txt", certificate.id),
            mime_type: EXPORT_MIME.to_string(),
            content,
        })
    }

    fn resolve_names(
        &self,
        patient_id: Uuid,
        professional_id: Uuid,
    ) -> Result<(String, String), DocumentError> {
        let patient_names: HashMap<Uuid, String> = self
            .patients
            .try_load()?
            .unwrap_or_default()
            .into_iter()
            .map(|p| (p.id, p.full_name()))
            .collect();
        let professional_names: HashMap<Uuid, String> = self
            .users
            .try_load()?
            .unwrap_or_default()
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok((
            patient_names
                .get(&patient_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
            professional_names
                .get(&professional_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PROFESSIONAL.to_string()),
        ))
    }
}

/// A rest certificate must carry a positive rest duration.
fn validate_rest_days(
    kind: CertificateKind,
    rest_days: Option<u32>,
) -> Result<(), DocumentError> {
    if kind == CertificateKind::Repos && !matches!(rest_days, Some(days) if days > 0) {
        return Err(DocumentError::Validation(
            "a rest certificate requires a positive rest duration".to_string(),
        ));
    }
    Ok(())
}
