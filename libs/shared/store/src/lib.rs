pub mod collection;
pub mod local;

pub use collection::{Collection, Record};
pub use local::{LocalStore, StoreError};
