use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Storage key for the appointment collection.
pub const APPOINTMENTS_KEY: &str = "appointments";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Weak reference into the patient registry; may dangle after a
    /// patient deletion and is then rendered as a placeholder.
    pub patient_id: Uuid,
    /// Weak reference into the user directory.
    #[serde(rename = "professionnel_id")]
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Slot start, in minutes from midnight.
    pub fn start_minute(&self) -> i32 {
        (self.time.hour() * 60 + self.time.minute()) as i32
    }

    /// Slot end, exclusive: the slot is the half-open interval
    /// `[start_minute, end_minute)`.
    pub fn end_minute(&self) -> i32 {
        self.start_minute() + self.duration_minutes
    }

    pub fn start_datetime(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled appointments free their slot; everything else holds it.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

// ==============================================================================
// DENORMALIZED VIEWS
// ==============================================================================

/// Read-only projection joining an appointment to the names of its
/// patient and professional. Computed on demand, never persisted; missing
/// references resolve to placeholder text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentWithDetails {
    pub appointment: Appointment,
    pub patient_name: String,
    pub professional_name: String,
}

pub const UNKNOWN_PATIENT: &str = "Unknown patient";
pub const UNKNOWN_PROFESSIONAL: &str = "Unknown professional";

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot not available")]
    SlotNotAvailable,

    #[error("Invalid appointment duration: {0} minutes")]
    InvalidDuration(i32),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
