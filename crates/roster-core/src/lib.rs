//! roster-core: incident model, repository seam and the roster engine.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::RepoError`] / [`error::RosterError`] at the
//!   engine boundary, `anyhow::Result` for configuration.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod repo;
pub mod view;

pub use engine::{RosterEngine, RosterOptions};
pub use error::{ErrorCode, RepoError, RosterError};
pub use repo::IncidentRepository;
