//! Memoria client core.
//!
//! The headless data and mutation layer of the Memoria yearbook platform's
//! client: an owned query cache with snapshot/rollback, optimistic memory
//! uploads, the moderation queue, upload link codes, sign-in with 2FA and
//! payment settings. A UI shell embeds [`state::ClientState`] and drives
//! these modules; all rendering concerns stay out of this crate.
//!
//! All business logic (payment splits, code generation, file storage,
//! authentication) lives server-side; this crate sequences requests,
//! validates input before it leaves the machine, and keeps the local cache
//! honest on both success and failure.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod links;
pub mod memories;
pub mod models;
pub mod payments;
pub mod state;

pub use crate::api::{HttpApi, MemoriaApi};
pub use crate::config::ClientConfig;
pub use crate::errors::ApiError;
pub use crate::state::ClientState;
