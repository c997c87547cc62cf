//! User and session management backend.
//!
//! This facade crate re-exports the till crates for convenient access.
//!
//! ## Crate Organization
//!
//! - [`core`] — Typed ids, credential constants, logging
//! - [`database`] — PostgreSQL connectivity and schema
//! - [`auth`] — Password hashing, tokens, gates, and role checks
//! - [`server`] — Configuration, routes, and user management

pub use till_core       as core;
pub use till_database   as database;
pub use till_auth       as auth;
pub use till_server     as server;

// Re-export commonly used items at the root
pub use till_core::log;
pub use till_server::Config;
pub use till_server::run;
