//! duet-core - Core types and traits for the duet API client.
//!
//! This crate holds everything the client and its stores share: tokens, the
//! [`Session`] pair, login and registration input, the profile types, the
//! unified [`Error`], and the [`SessionStore`] abstraction.

pub mod credentials;
pub mod error;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, Registration};
pub use error::Error;
pub use session::Session;
pub use store::MemorySessionStore;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::SessionStore;
pub use types::{ApiUrl, ProfileUpdate, User};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
