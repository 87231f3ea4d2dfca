//! Credential bundle lifecycle.
//!
//! - [`issuer`] - builds fresh bundles
//! - [`authorizer`] - validates access / anti-forgery pairs
//! - [`rotator`] - exchanges a refresh secret for a new bundle

pub mod authorizer;
pub mod issuer;
pub mod rotator;

pub use authorizer::Authorizer;
pub use issuer::TokenIssuer;
pub use rotator::Rotator;
