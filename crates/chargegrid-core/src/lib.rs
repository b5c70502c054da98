pub mod config;

pub use config::{AllocatorConfig, ChargeGridConfig, ServerConfig};
