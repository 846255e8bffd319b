pub mod directory;
pub mod password;
pub mod session;
