pub mod config;
pub mod error;
pub mod types;
pub mod validate;

pub use config::{AppConfig, Endpoint, StorageBackend, load_config};
pub use error::{Error, Result};
pub use types::*;
pub use validate::validate_generated;
