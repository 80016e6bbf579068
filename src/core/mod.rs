pub mod cleanup;
pub mod config;
pub mod extract;
pub mod github;
pub mod progress;
