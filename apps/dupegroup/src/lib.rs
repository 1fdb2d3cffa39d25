//! # dupegroup
//!
//! Command line front end for `dupegroup-core`: a redb photo database,
//! record import, TOML configuration, and logging of every run.

pub mod cli;
pub mod config;
pub mod error;
pub mod import;

pub use error::AppError;
