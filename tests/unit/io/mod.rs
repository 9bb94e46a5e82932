pub mod configuration;
pub mod loader;
pub mod progress;
