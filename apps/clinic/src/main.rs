use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod context;

use context::ClinicContext;
use shared_config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic management services");

    // Load configuration
    let config = AppConfig::from_env();
    info!(
        data_dir = %config.data_dir.display(),
        namespace = %config.storage_namespace,
        "using local storage"
    );

    // Wire every service to the shared store
    let context = ClinicContext::new(&config)?;
    context.bootstrap()?;

    let patients = context.patients.list()?;
    let appointments = context.scheduler.today()?;
    info!(
        patients = patients.len(),
        appointments_today = appointments.len(),
        "clinic ready"
    );

    Ok(())
}
