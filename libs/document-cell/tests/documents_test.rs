use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;

use consultation_cell::{ConsultationLedger, CreateConsultationRequest};
use document_cell::{
    CertificateFields, CertificateKind, CertificateService, CreateCertificateRequest,
    CreatePrescriptionRequest, DocumentError, Medication, PrescriptionFields,
    PrescriptionService, UpdateCertificateRequest, EXPORT_MIME,
};
use patient_cell::{CreatePatientRequest, PatientRegistry, Sex};
use shared_store::LocalStore;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn medication(name: &str) -> Medication {
    Medication {
        name: name.to_string(),
        dosage: "500 mg".to_string(),
        frequency: "3 fois par jour".to_string(),
        duration: "7 jours".to_string(),
        instructions: Some("Pendant les repas".to_string()),
    }
}

fn consultation(store: &Arc<LocalStore>) -> (ConsultationLedger, Uuid, Uuid, Uuid) {
    let ledger = ConsultationLedger::new(Arc::clone(store));
    let patient_id = Uuid::new_v4();
    let professional_id = Uuid::new_v4();
    let consultation = ledger
        .create(CreateConsultationRequest {
            patient_id,
            professional_id,
            date: date(),
            symptoms: "Angine".to_string(),
            diagnosis: "Angine bactérienne".to_string(),
            treatment: "Antibiotiques".to_string(),
            notes: None,
        })
        .unwrap();
    (ledger, consultation.id, patient_id, professional_id)
}

#[test]
fn prescription_from_consultation_copies_parties() {
    let store = Arc::new(LocalStore::in_memory());
    let (_ledger, consultation_id, patient_id, professional_id) = consultation(&store);
    let service = PrescriptionService::new(store);

    let prescription = service
        .create_from_consultation(
            consultation_id,
            PrescriptionFields {
                issued_on: date(),
                medications: vec![medication("Amoxicilline")],
                instructions: "Terminer la boîte".to_string(),
                signature: "Dr. Martin".to_string(),
            },
        )
        .unwrap();

    assert_eq!(prescription.patient_id, patient_id);
    assert_eq!(prescription.professional_id, professional_id);
    assert_eq!(prescription.consultation_id, Some(consultation_id));
}

#[test]
fn prescription_from_unknown_consultation_fails() {
    let service = PrescriptionService::new(Arc::new(LocalStore::in_memory()));
    let result = service.create_from_consultation(
        Uuid::new_v4(),
        PrescriptionFields {
            issued_on: date(),
            medications: vec![],
            instructions: String::new(),
            signature: String::new(),
        },
    );
    assert_matches!(result, Err(DocumentError::ConsultationNotFound));
}

#[test]
fn prescription_export_renders_header_and_lines() {
    let store = Arc::new(LocalStore::in_memory());
    let patients = PatientRegistry::new(Arc::clone(&store));
    let patient = patients
        .create(CreatePatientRequest {
            first_name: "Alice".to_string(),
            last_name: "Durand".to_string(),
            sex: Sex::Feminin,
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
            phone: "0612345678".to_string(),
            address: String::new(),
            blood_group: None,
            medical_history: String::new(),
        })
        .unwrap();

    let service = PrescriptionService::new(store);
    let prescription = service
        .create(CreatePrescriptionRequest {
            patient_id: patient.id,
            professional_id: Uuid::new_v4(),
            consultation_id: None,
            issued_on: date(),
            medications: vec![medication("Amoxicilline"), medication("Ibuprofène")],
            instructions: "Terminer la boîte".to_string(),
            signature: "Dr. Martin".to_string(),
        })
        .unwrap();

    let export = service.export(prescription.id).unwrap();
    assert_eq!(export.filename, format!("prescription_{}.txt", prescription.id));
    assert_eq!(export.mime_type, EXPORT_MIME);

    // Clinic letterhead comes from the seeded default profile.
    assert!(export.content.contains("Cabinet Médical"));
    assert!(export.content.contains("ORDONNANCE"));
    assert!(export.content.contains("Alice Durand"));
    assert!(export.content.contains("Amoxicilline"));
    assert!(export.content.contains("Ibuprofène"));
    assert!(export.content.contains("Dr. Martin"));
    // The professional id resolves to nothing and renders as a placeholder.
    assert!(export.content.contains("Unknown professional"));
}

#[test]
fn export_of_unknown_document_fails() {
    let store = Arc::new(LocalStore::in_memory());
    let prescriptions = PrescriptionService::new(Arc::clone(&store));
    let certificates = CertificateService::new(store);

    assert_matches!(
        prescriptions.export(Uuid::new_v4()),
        Err(DocumentError::NotFound)
    );
    assert_matches!(
        certificates.export(Uuid::new_v4()),
        Err(DocumentError::NotFound)
    );
}

#[test]
fn rest_certificate_requires_positive_duration() {
    let service = CertificateService::new(Arc::new(LocalStore::in_memory()));

    let mut request = CreateCertificateRequest {
        patient_id: Uuid::new_v4(),
        professional_id: Uuid::new_v4(),
        consultation_id: None,
        issued_on: date(),
        kind: CertificateKind::Repos,
        rest_days: None,
        commentary: String::new(),
    };
    assert_matches!(
        service.create(request.clone()),
        Err(DocumentError::Validation(_))
    );

    request.rest_days = Some(0);
    assert_matches!(
        service.create(request.clone()),
        Err(DocumentError::Validation(_))
    );

    request.rest_days = Some(5);
    let certificate = service.create(request).unwrap();
    assert_eq!(certificate.rest_days, Some(5));
}

#[test]
fn other_certificate_kinds_do_not_require_duration() {
    let service = CertificateService::new(Arc::new(LocalStore::in_memory()));

    let certificate = service
        .create(CreateCertificateRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            consultation_id: None,
            issued_on: date(),
            kind: CertificateKind::Aptitude,
            rest_days: None,
            commentary: "Apte à la pratique sportive".to_string(),
        })
        .unwrap();

    let export = service.export(certificate.id).unwrap();
    assert_eq!(export.filename, format!("certificat_{}.txt", certificate.id));
    assert!(export.content.contains("CERTIFICAT MÉDICAL"));
    assert!(export.content.contains("aptitude"));
    assert!(export.content.contains("Apte à la pratique sportive"));
}

#[test]
fn update_validates_merged_certificate_state() {
    let service = CertificateService::new(Arc::new(LocalStore::in_memory()));
    let certificate = service
        .create(CreateCertificateRequest {
            patient_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            consultation_id: None,
            issued_on: date(),
            kind: CertificateKind::Maladie,
            rest_days: None,
            commentary: String::new(),
        })
        .unwrap();

    // Switching to "repos" without a duration anywhere must fail.
    let result = service.update(
        certificate.id,
        UpdateCertificateRequest {
            kind: Some(CertificateKind::Repos),
            ..Default::default()
        },
    );
    assert_matches!(result, Err(DocumentError::Validation(_)));

    // Supplying the duration in the same update succeeds.
    let updated = service
        .update(
            certificate.id,
            UpdateCertificateRequest {
                kind: Some(CertificateKind::Repos),
                rest_days: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.kind, CertificateKind::Repos);
    assert_eq!(updated.rest_days, Some(3));
}

#[test]
fn certificate_from_consultation_copies_parties() {
    let store = Arc::new(LocalStore::in_memory());
    let (_ledger, consultation_id, patient_id, professional_id) = consultation(&store);
    let service = CertificateService::new(store);

    let certificate = service
        .create_from_consultation(
            consultation_id,
            CertificateFields {
                issued_on: date(),
                kind: CertificateKind::Repos,
                rest_days: Some(2),
                commentary: "Repos prescrit".to_string(),
            },
        )
        .unwrap();

    assert_eq!(certificate.patient_id, patient_id);
    assert_eq!(certificate.professional_id, professional_id);
    assert_eq!(certificate.consultation_id, Some(consultation_id));
}
