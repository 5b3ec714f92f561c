//! `relay-core`: the slash-command engine (C1-C12) and context-window
//! manager (C13-C20) behind an interactive AI coding assistant, plus the
//! ambient config/logging/streaming stack a runnable process needs (C21-C23).

pub mod capability;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod stream;
pub mod window;

pub use config::RelayConfig;
pub use error::CompactionError;
pub use error::CoreError;
pub use error::ParseError;
pub use error::RegistryError;
pub use error::TruncateError;
pub use logging::LoggingConfig;
