//! Storage traits for credential bundles and users.
//!
//! The token core depends only on these traits, never on a concrete backend.
//!
//! # Implementations
//!
//! - [`memory`] - in-process backends (tests, single-node deployments)
//! - `sessionward-auth-postgres` - PostgreSQL storage backend

pub mod bundle;
pub mod memory;
pub mod user;

pub use bundle::BundleStore;
pub use memory::{InMemoryBundleStore, InMemoryUserStore};
pub use user::{User, UserStore};
