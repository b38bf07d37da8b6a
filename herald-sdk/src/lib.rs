//! Shared wire types for the herald webhook surface, plus an optional
//! HTTP client behind the `client` feature.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
