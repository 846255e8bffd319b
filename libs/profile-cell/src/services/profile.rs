use std::sync::Arc;

use tracing::info;

use shared_store::{LocalStore, Record};

use crate::models::{ClinicProfile, ProfileError, CLINIC_PROFILE_KEY};

pub struct ClinicProfileService {
    record: Record<ClinicProfile>,
}

impl ClinicProfileService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            record: Record::new(store, CLINIC_PROFILE_KEY),
        }
    }

    /// The current profile, seeding the default on first access.
    pub fn get(&self) -> Result<ClinicProfile, ProfileError> {
        Ok(self.record.load_or_seed(ClinicProfile::default_profile)?)
    }

    pub fn update(&self, profile: ClinicProfile) -> Result<ClinicProfile, ProfileError> {
        self.record.save(&profile)?;
        info!("Clinic profile updated");
        Ok(profile)
    }

    pub fn reset(&self) -> Result<ClinicProfile, ProfileError> {
        let profile = ClinicProfile::default_profile();
        self.record.save(&profile)?;
        info!("Clinic profile reset to default");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_access_seeds_the_default() {
        let service = ClinicProfileService::new(Arc::new(LocalStore::in_memory()));
        assert_eq!(service.get().unwrap(), ClinicProfile::default_profile());
    }

    #[test]
    fn update_overwrites_and_reset_restores() {
        let service = ClinicProfileService::new(Arc::new(LocalStore::in_memory()));

        let mut profile = service.get().unwrap();
        profile.name = "Cabinet du Parc".to_string();
        service.update(profile.clone()).unwrap();
        assert_eq!(service.get().unwrap().name, "Cabinet du Parc");

        service.reset().unwrap();
        assert_eq!(service.get().unwrap(), ClinicProfile::default_profile());
    }
}
