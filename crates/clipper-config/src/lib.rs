//! Per-deployment configuration loaded from the environment.

pub mod config;
pub mod env;
pub mod resource_mode;

pub use config::{ClipperConfig, VirtualDisplayConfig};
pub use env::{EnvConfigLoader, EnvError};
pub use resource_mode::ResourceMode;
