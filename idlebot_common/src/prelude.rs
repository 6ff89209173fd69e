//! Prelude module for common re-exports.
//!
//! ```rust
//! use idlebot_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::controller::config::{
    ActuatorConfig, ControllerConfig, DwellConfig, DwellRange, TimingConfig,
};

// ─── Drivers ────────────────────────────────────────────────────────
pub use crate::hal::config::DriverConfig;
pub use crate::hal::driver::{DriverFactory, ServoDriver, ServoError};

// ─── Exit protocol ──────────────────────────────────────────────────
pub use crate::exit::{EXIT_FAULT, EXIT_QUIT, EXIT_RELOAD, ExitKind};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILE, MAX_CHANNELS};
