/*
[INPUT]:  Public API exports for scholarpay-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod app;
pub mod config;
pub mod keyfile;

// Re-export main types for convenience
pub use app::{App, describe_failure};
pub use config::CliConfig;
pub use keyfile::KeyFile;
