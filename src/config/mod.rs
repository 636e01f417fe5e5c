//! Configuration module for safety-plan
//!
//! Export settings shared between the wizard and the controller. There is no
//! configuration file and no environment lookup: callers build an
//! [`ExportConfig`] in code, starting from its defaults.

pub mod export;

pub use export::{ConfigError, ExportConfig};
