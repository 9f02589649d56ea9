//! A music store clerk: an agent that answers customers by looking up the
//! store's catalog.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring the clerk into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod config;
mod session;
pub mod tools;

pub use catalog::{Catalog, CatalogError, CatalogSource};
pub use config::{Config, ConfigError};
pub use session::{DEFAULT_SYSTEM_PROMPT, Session, SessionBuilder};

/// Re-exports of [`record_clerk_core`] crate.
pub mod core {
    pub use record_clerk_core::*;
}
