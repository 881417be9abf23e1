//! # Tyretrack (vehicle and tyre maintenance tracker)
//!
//! `tyretrack` lets signed-in users list, add, and inspect their vehicles and the
//! tyre record attached to each one. Pages are rendered on the server; storage
//! and authentication are delegated to external backends.
//!
//! ## Record model
//!
//! Vehicles live under `users/{userId}/vehicles/{plate}`. The plate is the
//! document key, so writing a plate that already exists replaces the stored
//! record (last write wins). Every vehicle carries exactly one tyre record.
//! Records read from a backend are parsed explicitly; see [`vehicles::record`].
//!
//! ## Access control
//!
//! The session guard ([`session::guard`]) only checks whether the `auth` cookie
//! is present and redirects between the auth pages and `/dashboard`. Validating
//! the credential is the identity provider's job and happens when a protected
//! handler builds its [`session::AuthContext`].
//!
//! ## Backends
//!
//! - Stores: in-memory, Firestore (REST), Postgres (JSONB document table).
//! - Identity: Firebase Identity Toolkit (REST) or local in-process accounts.

pub mod api;
pub mod cli;
pub mod identity;
pub mod session;
pub mod store;
pub mod vehicles;
pub mod views;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
