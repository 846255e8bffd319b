pub mod models;
pub mod services;

pub use models::*;
pub use services::directory::UserDirectory;
pub use services::password::PasswordService;
pub use services::session::SessionService;
