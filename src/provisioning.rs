//! Typed client over the project provisioning API.
//!
//! `model` holds the wire shapes and the pure reshaping helpers (cluster suffix stripping,
//! role-binding outcome lookup); `client` holds [`ProvisioningClient`], which performs exactly
//! one upstream call per operation after an implicit token renewal.

pub mod client;
pub mod model;

pub use client::*;
pub use model::*;
