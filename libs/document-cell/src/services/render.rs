use profile_cell::ClinicProfile;

use crate::models::{Certificate, Prescription};

const RULE: &str = "==============================================";

/// Fixed-layout clinic letterhead used by every exported document.
fn header(profile: &ClinicProfile) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&profile.name);
    out.push('\n');
    out.push_str(&profile.address);
    out.push('\n');
    out.push_str(&format!("Tél : {}  Email : {}\n", profile.phone, profile.email));
    out.push_str(&format!("N° d'enregistrement : {}\n", profile.registration_number));
    out.push_str(&format!("Directeur médical : {}\n", profile.medical_director));
    out.push_str(RULE);
    out.push('\n');
    out
}

pub fn render_prescription(
    profile: &ClinicProfile,
    prescription: &Prescription,
    patient_name: &str,
    professional_name: &str,
) -> String {
    let mut out = header(profile);
    out.push_str("\nORDONNANCE\n\n");
    out.push_str(&format!("Date : {}\n", prescription.issued_on));
    out.push_str(&format!("Patient : {}\n", patient_name));
    out.push_str(&format!("Prescripteur : {}\n\n", professional_name));

    out.push_str("Médicaments :\n");
    for medication in &prescription.medications {
        out.push_str(&format!(
            "  - {} | {} | {} | {}\n",
            medication.name, medication.dosage, medication.frequency, medication.duration
        ));
        if let Some(instructions) = &medication.instructions {
            out.push_str(&format!("    {}\n", instructions));
        }
    }

    if !prescription.instructions.is_empty() {
        out.push_str(&format!("\nConsignes : {}\n", prescription.instructions));
    }
    out.push_str(&format!("\nSignature : {}\n", prescription.signature));
    out
}

pub fn render_certificate(
    profile: &ClinicProfile,
    certificate: &Certificate,
    patient_name: &str,
    professional_name: &str,
) -> String {
    let mut out = header(profile);
    out.push_str("\nCERTIFICAT MÉDICAL\n\n");
    out.push_str(&format!("Date : {}\n", certificate.issued_on));
    out.push_str(&format!("Patient : {}\n", patient_name));
    out.push_str(&format!("Praticien : {}\n", professional_name));
    out.push_str(&format!("Type : {}\n", certificate.kind));

    if let Some(days) = certificate.rest_days {
        out.push_str(&format!("Durée de repos : {} jour(s)\n", days));
    }
    if !certificate.commentary.is_empty() {
        out.push_str(&format!("\n{}\n", certificate.commentary));
    }
    out
}
