//! Authentication and role gating.
//!
//! JWT bearer tokens with Argon2 password hashing. Tokens carry identity
//! only; role and active status are re-read from the [`Directory`] on every
//! request, so changes apply immediately without any revocation state.
//!
//! ## Identity Types
//!
//! - [`Member`] — A user as seen by everything outside the store
//! - [`Account`] — A member plus its password digest
//! - [`Role`] — Closed set of roles
//!
//! ## Security
//!
//! - [`Crypto`] — JWT signing and verification
//! - [`Claims`] — JWT payload structure
//! - [`password`] — Argon2 hashing and verification
//! - [`Roles`] — Per-route-group allow-set
//!
//! ## Gates (feature `server`)
//!
//! - [`authenticate`] — Bearer token to live member
//! - [`Guard`] — Middleware running authentication then authorization
//! - [`Auth`] — Extractor for the authenticated member
mod claims;
mod credentials;
mod crypto;
mod directory;
mod dto;
mod error;
mod member;
mod memory;
pub mod password;
mod rbac;
mod role;

pub use claims::*;
pub use credentials::*;
pub use crypto::*;
pub use directory::*;
pub use dto::*;
pub use error::*;
pub use member::*;
pub use memory::*;
pub use rbac::*;
pub use role::*;

#[cfg(feature = "database")]
mod repository;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
