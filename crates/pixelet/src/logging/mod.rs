//! Logging setup.
//!
//! The library itself only uses the `log` facade. Binaries call
//! [`init_logging`] once to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
