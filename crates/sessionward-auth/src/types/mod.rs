//! Core data types.

pub mod bundle;

pub use bundle::{CredentialBundle, OwnerId};
