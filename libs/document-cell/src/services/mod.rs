pub mod certificate;
pub mod prescription;
pub mod render;
