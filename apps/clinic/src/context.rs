use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;

use appointment_cell::SchedulingService;
use auth_cell::{SessionService, UserDirectory};
use consultation_cell::ConsultationLedger;
use document_cell::{CertificateService, PrescriptionService};
use patient_cell::PatientRegistry;
use profile_cell::ClinicProfileService;
use shared_config::AppConfig;
use shared_store::LocalStore;

/// Every service wired to the same store, built once at startup.
pub struct ClinicContext {
    pub store: Arc<LocalStore>,
    pub patients: PatientRegistry,
    pub scheduler: SchedulingService,
    pub consultations: ConsultationLedger,
    pub prescriptions: PrescriptionService,
    pub certificates: CertificateService,
    pub users: UserDirectory,
    pub sessions: SessionService,
    pub profile: ClinicProfileService,
}

impl ClinicContext {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(
            LocalStore::open(&config.data_dir, &config.storage_namespace)
                .with_context(|| {
                    format!("failed to open data directory {}", config.data_dir.display())
                })?,
        );

        Ok(Self {
            patients: PatientRegistry::new(store.clone()),
            scheduler: SchedulingService::new(store.clone()),
            consultations: ConsultationLedger::new(store.clone()),
            prescriptions: PrescriptionService::new(store.clone()),
            certificates: CertificateService::new(store.clone()),
            users: UserDirectory::new(store.clone()),
            sessions: SessionService::new(store.clone()),
            profile: ClinicProfileService::new(store.clone()),
            store,
        })
    }

    /// Touches every collection so first launch writes each record file,
    /// including the default admin account and clinic profile.
    pub fn bootstrap(&self) -> anyhow::Result<()> {
        let users = self.users.list().context("failed to load user accounts")?;
        let profile = self.profile.get().context("failed to load clinic profile")?;
        self.patients.list().context("failed to load patients")?;
        self.scheduler.list().context("failed to load appointments")?;
        self.consultations
            .list()
            .context("failed to load consultations")?;
        self.prescriptions
            .list()
            .context("failed to load prescriptions")?;
        self.certificates
            .list()
            .context("failed to load certificates")?;
        info!(
            users = users.len(),
            clinic = %profile.name,
            "clinic context ready"
        );
        Ok(())
    }
}
