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
    CreatePrescriptionRequest, DocumentError, DocumentExport, Prescription, PrescriptionFields,
    UpdatePrescriptionRequest, EXPORT_MIME, PRESCRIPTIONS_KEY,
};
use crate::services::render;

pub struct PrescriptionService {
    prescriptions: Collection<Prescription>,
    consultations: Collection<Consultation>,
    patients: Collection<Patient>,
    users: Collection<User>,
    profile: ClinicProfileService,
}

impl PrescriptionService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            prescriptions: Collection::new(Arc::clone(&store), PRESCRIPTIONS_KEY),
            consultations: Collection::new(Arc::clone(&store), CONSULTATIONS_KEY),
            patients: Collection::new(Arc::clone(&store), PATIENTS_KEY),
            users: Collection::new(Arc::clone(&store), USERS_KEY),
            profile: ClinicProfileService::new(store),
        }
    }

    fn load(&self) -> Result<Vec<Prescription>, DocumentError> {
        Ok(self.prescriptions.load_or_seed(Vec::new)?)
    }

    pub fn create(
        &self,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, DocumentError> {
        self.insert(Prescription {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            professional_id: request.professional_id,
            consultation_id: request.consultation_id,
            issued_on: request.issued_on,
            medications: request.medications,
            instructions: request.instructions,
            signature: request.signature,
            created_at: Utc::now(),
        })
    }

    /// Issue a prescription from a consultation: patient and professional
    /// are copied forward and the consultation link is stamped.
    pub fn create_from_consultation(
        &self,
        consultation_id: Uuid,
        fields: PrescriptionFields,
    ) -> Result<Prescription, DocumentError> {
        let consultation = self
            .consultations
            .try_load()?
            .unwrap_or_default()
            .into_iter()
            .find(|c| c.id == consultation_id)
            .ok_or(DocumentError::ConsultationNotFound)?;

        self.insert(Prescription {
            id: Uuid::new_v4(),
            patient_id: consultation.patient_id,
            professional_id: consultation.professional_id,
            consultation_id: Some(consultation.id),
            issued_on: fields.issued_on,
            medications: fields.medications,
            instructions: fields.instructions,
            signature: fields.signature,
            created_at: Utc::now(),
        })
    }

    fn insert(&self, prescription: Prescription) -> Result<Prescription, DocumentError> {
        info!(
            "Issued prescription {} for patient {}",
            prescription.id, prescription.patient_id
        );
        let mut prescriptions = self.load()?;
        prescriptions.push(prescription.clone());
        self.prescriptions.save_all(&prescriptions)?;
        Ok(prescription)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Prescription>, DocumentError> {
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    pub fn list(&self) -> Result<Vec<Prescription>, DocumentError> {
        self.load()
    }

    pub fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Prescription>, DocumentError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|p| p.patient_id == patient_id)
            .collect())
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, DocumentError> {
        let mut prescriptions = self.load()?;
        let prescription = prescriptions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DocumentError::NotFound)?;

        if let Some(issued_on) = request.issued_on {
            prescription.issued_on = issued_on;
        }
        if let Some(medications) = request.medications {
            prescription.medications = medications;
        }
        if let Some(instructions) = request.instructions {
            prescription.instructions = instructions;
        }
        if let Some(signature) = request.signature {
            prescription.signature = signature;
        }

        let updated = prescription.clone();
        debug!("Updated prescription {}", id);
        self.prescriptions.save_all(&prescriptions)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, DocumentError> {
        let mut prescriptions = self.load()?;
        let before = prescriptions.len();
        prescriptions.retain(|p| p.id != id);

        if prescriptions.len() == before {
            return Ok(false);
        }

        info!("Deleted prescription {}", id);
        self.prescriptions.save_all(&prescriptions)?;
        Ok(true)
    }

    /// Render the prescription as a fixed-layout plain-text document.
    pub fn export(&self, id: Uuid) -> Result<DocumentExport, DocumentError> {
        let prescription = self.get(id)?.ok_or(DocumentError::NotFound)?;
        let profile = self.profile.get().map_err(|e| match e {
            profile_cell::ProfileError::Storage(err) => DocumentError::Storage(err),
        })?;

        let (patient_name, professional_name) =
            self.resolve_names(prescription.patient_id, prescription.professional_id)?;

        let content =
            render::render_prescription(&profile, &prescription, &patient_name, &professional_name);

        Ok(DocumentExport {
            filename: format!("prescription_{}.txt", prescription.id),
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
