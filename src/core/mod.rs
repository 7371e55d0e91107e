pub mod config;
pub mod error;
pub mod types;

pub use config::FowConfig;
pub use error::{FowError, Result};
