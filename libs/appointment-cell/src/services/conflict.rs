use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_store::{Collection, LocalStore};

use crate::models::{Appointment, AppointmentError, APPOINTMENTS_KEY};

/// Per-professional, per-day slot conflict detection.
pub struct ConflictDetectionService {
    appointments: Collection<Appointment>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            appointments: Collection::new(store, APPOINTMENTS_KEY),
        }
    }

    /// Check whether `[time, time + duration)` is free for the given
    /// professional on the given date.
    ///
    /// The boundary is open: a slot starting exactly when another ends is
    /// available. Cancelled appointments never conflict, and `exclude`
    /// skips the appointment currently being edited.
    pub fn is_time_slot_available(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        debug!(
            "Checking slot for professional {} on {} at {} ({} min)",
            professional_id, date, time, duration_minutes
        );

        let candidate_start = (time.hour() * 60 + time.minute()) as i32;
        let candidate_end = candidate_start + duration_minutes;

        let appointments = self.appointments.load_or_seed(Vec::new)?;
        let conflict = appointments.iter().any(|existing| {
            existing.professional_id == professional_id
                && existing.date == date
                && existing.status.occupies_slot()
                && exclude != Some(existing.id)
                && intervals_overlap(
                    candidate_start,
                    candidate_end,
                    existing.start_minute(),
                    existing.end_minute(),
                )
        });

        if conflict {
            warn!(
                "Slot conflict for professional {} on {} at {}",
                professional_id, date, time
            );
        }

        Ok(!conflict)
    }
}

/// Strict half-open interval intersection: touching endpoints do not
/// overlap.
fn intervals_overlap(start1: i32, end1: i32, start2: i32, end2: i32) -> bool {
    start1 < end2 && start2 < end1
}
