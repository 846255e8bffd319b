use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Runtime configuration for the clinic application.
///
/// Everything is resolved from the environment once at startup and passed
/// down to the services that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the persisted record files.
    pub data_dir: PathBuf,
    /// Prefix applied to every storage key.
    pub storage_namespace: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("CLINIC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                warn!("CLINIC_DATA_DIR not set, using ./data");
                PathBuf::from("./data")
            });

        let storage_namespace = env::var("CLINIC_STORAGE_NAMESPACE").unwrap_or_else(|_| {
            warn!("CLINIC_STORAGE_NAMESPACE not set, using default");
            "clinic".to_string()
        });

        Self {
            data_dir,
            storage_namespace,
        }
    }
}
