//! elvup library
//!
//! Fetches the newest tagged ElvUI release from GitHub and installs it into a
//! local addon directory. The `elvup` binary is a thin wrapper around
//! [`commands::install::install_latest`].

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
