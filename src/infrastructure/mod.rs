// Infrastructure: the clang front end, directory scanning and configuration.

pub mod clang_ingest;
pub mod clang_runner;
pub mod config;
pub mod project_loader;

pub use clang_runner::ClangProvider;
pub use config::{Config, ConfigError};
pub use project_loader::ProjectLoader;
