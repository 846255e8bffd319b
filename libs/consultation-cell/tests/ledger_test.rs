use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use appointment_cell::{AppointmentStatus, BookAppointmentRequest, SchedulingService};
use consultation_cell::{
    ClinicalFields, ConsultationError, ConsultationLedger, CreateConsultationRequest,
    UpdateConsultationRequest,
};
use shared_store::LocalStore;

fn fields() -> ClinicalFields {
    ClinicalFields {
        symptoms: "Toux persistante".to_string(),
        diagnosis: "Bronchite".to_string(),
        treatment: "Repos et hydratation".to_string(),
        notes: None,
    }
}

#[test]
fn create_from_appointment_copies_provenance() {
    let store = Arc::new(LocalStore::in_memory());
    let scheduler = SchedulingService::new(Arc::clone(&store));
    let ledger = ConsultationLedger::new(Arc::clone(&store));

    let patient_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let appointment = scheduler
        .book(BookAppointmentRequest {
            patient_id,
            professional_id,
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 30,
            reason: "Consultation".to_string(),
            notes: None,
        })
        .unwrap();

    let consultation = ledger
        .create_from_appointment(appointment.id, fields())
        .unwrap();

    assert_eq!(consultation.patient_id, patient_id);
    assert_eq!(consultation.professional_id, professional_id);
    assert_eq!(consultation.date, date);
    assert_eq!(consultation.appointment_link, Some(appointment.id));

    // The appointment status is deliberately left alone.
    let after = scheduler.get(appointment.id).unwrap().unwrap();
    assert_eq!(after.status, AppointmentStatus::Confirmed);
}

#[test]
fn create_from_unknown_appointment_fails() {
    let ledger = ConsultationLedger::new(Arc::new(LocalStore::in_memory()));
    let result = ledger.create_from_appointment(Uuid::new_v4(), fields());
    assert_matches!(result, Err(ConsultationError::AppointmentNotFound));
}

#[test]
fn standalone_consultations_have_no_link() {
    let ledger = ConsultationLedger::new(Arc::new(LocalStore::in_memory()));

    let consultation = ledger
        .create(CreateConsultationRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            symptoms: "Fièvre".to_string(),
            diagnosis: "Grippe".to_string(),
            treatment: "Paracétamol".to_string(),
            notes: Some("Revoir dans une semaine".to_string()),
        })
        .unwrap();

    assert!(consultation.appointment_link.is_none());
    assert_eq!(ledger.list().unwrap().len(), 1);
}

#[test]
fn update_merges_and_delete_removes() {
    let ledger = ConsultationLedger::new(Arc::new(LocalStore::in_memory()));
    let consultation = ledger
        .create(CreateConsultationRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            symptoms: "Fièvre".to_string(),
            diagnosis: String::new(),
            treatment: String::new(),
            notes: None,
        })
        .unwrap();

    let updated = ledger
        .update(
            consultation.id,
            UpdateConsultationRequest {
                diagnosis: Some("Angine".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.diagnosis, "Angine");
    assert_eq!(updated.symptoms, "Fièvre");

    assert!(ledger.delete(consultation.id).unwrap());
    assert!(!ledger.delete(consultation.id).unwrap());
    assert_matches!(
        ledger.update(consultation.id, UpdateConsultationRequest::default()),
        Err(ConsultationError::NotFound)
    );
}

#[test]
fn for_patient_filters_by_patient() {
    let ledger = ConsultationLedger::new(Arc::new(LocalStore::in_memory()));
    let patient = Uuid::new_v4();

    for _ in 0..2 {
        ledger
            .create(CreateConsultationRequest {
                patient_id: patient,
                professional_id: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                symptoms: String::new(),
                diagnosis: String::new(),
                treatment: String::new(),
                notes: None,
            })
            .unwrap();
    }
    ledger
        .create(CreateConsultationRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
            symptoms: String::new(),
            diagnosis: String::new(),
            treatment: String::new(),
            notes: None,
        })
        .unwrap();

    assert_eq!(ledger.for_patient(patient).unwrap().len(), 2);
}

#[test]
fn details_render_placeholders_for_dangling_ids() {
    let ledger = ConsultationLedger::new(Arc::new(LocalStore::in_memory()));
    ledger
        .create(CreateConsultationRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            symptoms: String::new(),
            diagnosis: String::new(),
            treatment: String::new(),
            notes: None,
        })
        .unwrap();

    let details = ledger.list_with_details().unwrap();
    assert_eq!(details[0].patient_name, appointment_cell::UNKNOWN_PATIENT);
    assert_eq!(
        details[0].professional_name,
        appointment_cell::UNKNOWN_PROFESSIONAL
    );
}
