use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::{Collection, LocalStore};

use crate::models::{
    CreatePatientRequest, Patient, PatientError, UpdatePatientRequest, PATIENTS_KEY,
};

const FILE_NUMBER_PREFIX: &str = "DOS";

pub struct PatientRegistry {
    patients: Collection<Patient>,
}

impl PatientRegistry {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            patients: Collection::new(store, PATIENTS_KEY),
        }
    }

    fn load(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.patients.load_or_seed(Vec::new)?)
    }

    pub fn create(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let mut patients = self.load()?;
        let file_number = next_file_number(&patients);

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            sex: request.sex,
            birth_date: request.birth_date,
            phone: request.phone,
            address: request.address,
            blood_group: request.blood_group,
            medical_history: request.medical_history,
            file_number,
            registered_at: Utc::now(),
        };

        info!(
            "Registered patient {} with file number {}",
            patient.id, patient.file_number
        );

        patients.push(patient.clone());
        self.patients.save_all(&patients)?;
        Ok(patient)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Patient>, PatientError> {
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    pub fn list(&self) -> Result<Vec<Patient>, PatientError> {
        self.load()
    }

    pub fn update(&self, id: Uuid, request: UpdatePatientRequest) -> Result<Patient, PatientError> {
        let mut patients = self.load()?;
        let patient = patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PatientError::NotFound)?;

        if let Some(first_name) = request.first_name {
            patient.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            patient.last_name = last_name;
        }
        if let Some(sex) = request.sex {
            patient.sex = sex;
        }
        if let Some(birth_date) = request.birth_date {
            patient.birth_date = birth_date;
        }
        if let Some(phone) = request.phone {
            patient.phone = phone;
        }
        if let Some(address) = request.address {
            patient.address = address;
        }
        if let Some(blood_group) = request.blood_group {
            patient.blood_group = Some(blood_group);
        }
        if let Some(medical_history) = request.medical_history {
            patient.medical_history = medical_history;
        }

        let updated = patient.clone();
        debug!("Updated patient {}", id);
        self.patients.save_all(&patients)?;
        Ok(updated)
    }

    /// Delete is unconditional: dependent appointments and consultations
    /// keep their dangling references and render as placeholders.
    pub fn delete(&self, id: Uuid) -> Result<bool, PatientError> {
        let mut patients = self.load()?;
        let before = patients.len();
        patients.retain(|p| p.id != id);

        if patients.len() == before {
            return Ok(false);
        }

        info!("Deleted patient {}", id);
        self.patients.save_all(&patients)?;
        Ok(true)
    }

    /// Case-insensitive substring search over name, file number and phone.
    pub fn search(&self, term: &str) -> Result<Vec<Patient>, PatientError> {
        let needle = term.to_lowercase();
        Ok(self
            .load()?
            .into_iter()
            .filter(|p| {
                p.full_name().to_lowercase().contains(&needle)
                    || p.file_number.to_lowercase().contains(&needle)
                    || p.phone.contains(&needle)
            })
            .collect())
    }
}

/// Derive the next file number from the numbers currently in use.
///
/// The maximum live suffix plus one, so a live number is never reused but
/// numbers freed by deletion below the maximum are never handed out again
/// either.
fn next_file_number(patients: &[Patient]) -> String {
    let max = patients
        .iter()
        .filter_map(|p| p.file_number.strip_prefix(FILE_NUMBER_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:03}", FILE_NUMBER_PREFIX, max + 1)
}
