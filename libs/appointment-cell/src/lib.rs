pub mod models;
pub mod services;

pub use models::*;
pub use services::conflict::ConflictDetectionService;
pub use services::scheduling::SchedulingService;
