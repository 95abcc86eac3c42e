//! Role binding store
//!
//! A typed persistence facade for project role bindings over a generic,
//! kind-agnostic document store:
//! - `domain::storage` defines the store contract, entity kinds and identity keys
//! - `domain::role_binding` defines the role binding entity and repository trait
//! - `infrastructure` provides in-memory and PostgreSQL stores and the
//!   store-backed repository

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
