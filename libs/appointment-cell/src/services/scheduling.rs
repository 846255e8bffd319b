use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use auth_cell::models::{User, USERS_KEY};
use patient_cell::models::{Patient, PATIENTS_KEY};
use shared_store::{Collection, LocalStore};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentWithDetails,
    BookAppointmentRequest, UpdateAppointmentRequest, APPOINTMENTS_KEY, UNKNOWN_PATIENT,
    UNKNOWN_PROFESSIONAL,
};
use crate::services::conflict::ConflictDetectionService;

pub struct SchedulingService {
    appointments: Collection<Appointment>,
    patients: Collection<Patient>,
    users: Collection<User>,
    conflicts: ConflictDetectionService,
}

impl SchedulingService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            appointments: Collection::new(Arc::clone(&store), APPOINTMENTS_KEY),
            patients: Collection::new(Arc::clone(&store), PATIENTS_KEY),
            users: Collection::new(Arc::clone(&store), USERS_KEY),
            conflicts: ConflictDetectionService::new(store),
        }
    }

    fn load(&self) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.appointments.load_or_seed(Vec::new)?)
    }

    // ==========================================================================
    // MUTATIONS
    // ==========================================================================

    /// Book a new appointment. The slot is validated here, not by the
    /// caller, so a taken slot is rejected rather than silently
    /// double-booked.
    pub fn book(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        if request.duration_minutes <= 0 {
            return Err(AppointmentError::InvalidDuration(request.duration_minutes));
        }

        let available = self.conflicts.is_time_slot_available(
            request.professional_id,
            request.date,
            request.time,
            request.duration_minutes,
            None,
        )?;
        if !available {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            professional_id: request.professional_id,
            date: request.date,
            time: request.time,
            duration_minutes: request.duration_minutes,
            reason: request.reason,
            status: AppointmentStatus::Confirmed,
            notes: request.notes,
            created_at: Utc::now(),
        };

        info!(
            "Booked appointment {} for professional {} on {} at {}",
            appointment.id, appointment.professional_id, appointment.date, appointment.time
        );

        let mut appointments = self.load()?;
        appointments.push(appointment.clone());
        self.appointments.save_all(&appointments)?;
        Ok(appointment)
    }

    /// Merge partial fields into an existing appointment. When the slot
    /// coordinates change, availability is re-validated with the
    /// appointment itself excluded from the scan.
    pub fn update(
        &self,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if let Some(duration) = request.duration_minutes {
            if duration <= 0 {
                return Err(AppointmentError::InvalidDuration(duration));
            }
        }

        let mut appointments = self.load()?;
        let current = appointments
            .iter()
            .find(|a| a.id == id)
            .ok_or(AppointmentError::NotFound)?;

        let slot_changed = request.professional_id.is_some()
            || request.date.is_some()
            || request.time.is_some()
            || request.duration_minutes.is_some();

        let professional_id = request.professional_id.unwrap_or(current.professional_id);
        let date = request.date.unwrap_or(current.date);
        let time = request.time.unwrap_or(current.time);
        let duration_minutes = request.duration_minutes.unwrap_or(current.duration_minutes);
        let status = request.status.unwrap_or(current.status);

        if slot_changed && status.occupies_slot() {
            let available = self.conflicts.is_time_slot_available(
                professional_id,
                date,
                time,
                duration_minutes,
                Some(id),
            )?;
            if !available {
                return Err(AppointmentError::SlotNotAvailable);
            }
        }

        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppointmentError::NotFound)?;

        if let Some(patient_id) = request.patient_id {
            appointment.patient_id = patient_id;
        }
        appointment.professional_id = professional_id;
        appointment.date = date;
        appointment.time = time;
        appointment.duration_minutes = duration_minutes;
        appointment.status = status;
        if let Some(reason) = request.reason {
            appointment.reason = reason;
        }
        if let Some(notes) = request.notes {
            appointment.notes = Some(notes);
        }

        let updated = appointment.clone();
        debug!("Updated appointment {}", id);
        self.appointments.save_all(&appointments)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, AppointmentError> {
        let mut appointments = self.load()?;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);

        if appointments.len() == before {
            return Ok(false);
        }

        info!("Deleted appointment {}", id);
        self.appointments.save_all(&appointments)?;
        Ok(true)
    }

    /// Set the status directly. There is no transition graph: any status
    /// may follow any other, including reopening a cancelled appointment.
    pub fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<bool, AppointmentError> {
        let mut appointments = self.load()?;
        let Some(appointment) = appointments.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };

        info!(
            "Appointment {} status {} -> {}",
            id, appointment.status, status
        );
        appointment.status = status;
        self.appointments.save_all(&appointments)?;
        Ok(true)
    }

    // ==========================================================================
    // READS
    // ==========================================================================

    pub fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.load()?.into_iter().find(|a| a.id == id))
    }

    pub fn list(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.load()
    }

    pub fn is_time_slot_available(
        &self,
        professional_id: Uuid,
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        self.conflicts.is_time_slot_available(
            professional_id,
            date,
            time,
            duration_minutes,
            exclude,
        )
    }

    pub fn on_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.load()?.into_iter().filter(|a| a.date == date).collect())
    }

    /// Inclusive date range.
    pub fn in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|a| a.date >= from && a.date <= to)
            .collect())
    }

    pub fn today(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.on_date(Local::now().date_naive())
    }

    /// The current Sunday-to-Saturday week.
    pub fn this_week(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let today = Local::now().date_naive();
        let week_start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
        let week_end = week_start + Duration::days(6);
        self.in_range(week_start, week_end)
    }

    pub fn this_month(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let today = Local::now().date_naive();
        Ok(self
            .load()?
            .into_iter()
            .filter(|a| a.date.year() == today.year() && a.date.month() == today.month())
            .collect())
    }

    /// Appointments at or after the current instant, soonest first.
    pub fn upcoming(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let now = Local::now().naive_local();
        let mut upcoming: Vec<_> = self
            .load()?
            .into_iter()
            .filter(|a| a.start_datetime() >= now)
            .collect();
        upcoming.sort_by_key(|a| a.start_datetime());
        Ok(upcoming)
    }

    // ==========================================================================
    // DENORMALIZED VIEWS
    // ==========================================================================

    pub fn list_with_details(&self) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        let appointments = self.load()?;
        self.with_details(appointments)
    }

    /// Join appointments to patient and professional names by id lookup.
    /// Dangling references render as placeholders rather than failing.
    pub fn with_details(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
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

        Ok(appointments
            .into_iter()
            .map(|appointment| {
                let patient_name = patient_names
                    .get(&appointment.patient_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_PATIENT.to_string());
                let professional_name = professional_names
                    .get(&appointment.professional_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_PROFESSIONAL.to_string());
                AppointmentWithDetails {
                    appointment,
                    patient_name,
                    professional_name,
                }
            })
            .collect())
    }

    /// Case-insensitive substring search across patient name,
    /// professional name and reason. No ranking.
    pub fn search(&self, term: &str) -> Result<Vec<AppointmentWithDetails>, AppointmentError> {
        let needle = term.to_lowercase();
        Ok(self
            .list_with_details()?
            .into_iter()
            .filter(|details| {
                details.patient_name.to_lowercase().contains(&needle)
                    || details.professional_name.to_lowercase().contains(&needle)
                    || details.appointment.reason.to_lowercase().contains(&needle)
            })
            .collect())
    }
}
