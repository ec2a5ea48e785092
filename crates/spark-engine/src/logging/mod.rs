//! `log` facade wired to an `env_logger` backend.

mod init;

pub use init::{LoggingConfig, init_logging};
