pub mod models;
pub mod services;

pub use models::*;
pub use services::certificate::CertificateService;
pub use services::prescription::PrescriptionService;
