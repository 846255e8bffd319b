use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, APPOINTMENTS_KEY};
use auth_cell::models::{User, USERS_KEY};
use patient_cell::models::{Patient, PATIENTS_KEY};
use shared_store::{Collection, LocalStore};

use crate::models::{
    ClinicalFields, Consultation, ConsultationError, ConsultationWithDetails,
    CreateConsultationRequest, UpdateConsultationRequest, CONSULTATIONS_KEY,
};

pub struct ConsultationLedger {
    consultations: Collection<Consultation>,
    appointments: Collection<Appointment>,
    patients: Collection<Patient>,
    users: Collection<User>,
}

impl ConsultationLedger {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            consultations: Collection::new(Arc::clone(&store), CONSULTATIONS_KEY),
            appointments: Collection::new(Arc::clone(&store), APPOINTMENTS_KEY),
            patients: Collection::new(Arc::clone(&store), PATIENTS_KEY),
            users: Collection::new(store, USERS_KEY),
        }
    }

    fn load(&self) -> Result<Vec<Consultation>, ConsultationError> {
        Ok(self.consultations.load_or_seed(Vec::new)?)
    }

    pub fn create(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<Consultation, ConsultationError> {
        self.insert(Consultation {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            professional_id: request.professional_id,
            date: request.date,
            appointment_link: None,
            symptoms: request.symptoms,
            diagnosis: request.diagnosis,
            treatment: request.treatment,
            notes: request.notes,
            created_at: Utc::now(),
        })
    }

    /// Spawn a consultation from an appointment: patient, professional and
    /// date are copied forward and the provenance link is stamped.
    ///
    /// The appointment itself is left untouched; marking it completed is
    /// the caller's decision, not a side effect.
    pub fn create_from_appointment(
        &self,
        appointment_id: Uuid,
        fields: ClinicalFields,
    ) -> Result<Consultation, ConsultationError> {
        let appointment = self
            .appointments
            .try_load()?
            .unwrap_or_default()
            .into_iter()
            .find(|a| a.id == appointment_id)
            .ok_or(ConsultationError::AppointmentNotFound)?;

        self.insert(Consultation {
            id: Uuid::new_v4(),
            patient_id: appointment.patient_id,
            professional_id: appointment.professional_id,
            date: appointment.date,
            appointment_link: Some(appointment.id),
            symptoms: fields.symptoms,
            diagnosis: fields.diagnosis,
            treatment: fields.treatment,
            notes: fields.notes,
            created_at: Utc::now(),
        })
    }

    fn insert(&self, consultation: Consultation) -> Result<Consultation, ConsultationError> {
        info!(
            "Recorded consultation {} for patient {}",
            consultation.id, consultation.patient_id
        );
        let mut consultations = self.load()?;
        consultations.push(consultation.clone());
        self.consultations.save_all(&consultations)?;
        Ok(consultation)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Consultation>, ConsultationError> {
        Ok(self.load()?.into_iter().find(|c| c.id == id))
    }

    pub fn list(&self) -> Result<Vec<Consultation>, ConsultationError> {
        self.load()
    }

    pub fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Consultation>, ConsultationError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|c| c.patient_id == patient_id)
            .collect())
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdateConsultationRequest,
    ) -> Result<Consultation, ConsultationError> {
        let mut consultations = self.load()?;
        let consultation = consultations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ConsultationError::NotFound)?;

        if let Some(date) = request.date {
            consultation.date = date;
        }
        if let Some(symptoms) = request.symptoms {
            consultation.symptoms = symptoms;
        }
        if let Some(diagnosis) = request.diagnosis {
            consultation.diagnosis = diagnosis;
        }
        if let Some(treatment) = request.treatment {
            consultation.treatment = treatment;
        }
        if let Some(notes) = request.notes {
            consultation.notes = Some(notes);
        }

        let updated = consultation.clone();
        debug!("Updated consultation {}", id);
        self.consultations.save_all(&consultations)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, ConsultationError> {
        let mut consultations = self.load()?;
        let before = consultations.len();
        consultations.retain(|c| c.id != id);

        if consultations.len() == before {
            return Ok(false);
        }

        info!("Deleted consultation {}", id);
        self.consultations.save_all(&consultations)?;
        Ok(true)
    }

    pub fn list_with_details(&self) -> Result<Vec<ConsultationWithDetails>, ConsultationError> {
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

        Ok(self
            .load()?
            .into_iter()
            .map(|consultation| {
                let patient_name = patient_names
                    .get(&consultation.patient_id)
                    .cloned()
                    .unwrap_or_else(|| appointment_cell::UNKNOWN_PATIENT.to_string());
                let professional_name = professional_names
                    .get(&consultation.professional_id)
                    .cloned()
                    .unwrap_or_else(|| appointment_cell::UNKNOWN_PROFESSIONAL.to_string());
                ConsultationWithDetails {
                    consultation,
                    patient_name,
                    professional_name,
                }
            })
            .collect())
    }
}
