pub mod conflict;
pub mod scheduling;
