//! Token models shared by the token cache and the upstream clients.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
