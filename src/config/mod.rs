//! Configuration loading and application.
mod apply;
mod loader;
pub mod types;

#[cfg(test)]
mod tests;

pub use apply::resolve_settings;
pub use loader::{load_config, load_config_file};
