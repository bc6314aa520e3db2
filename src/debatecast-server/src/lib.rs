//! DebateCast HTTP service.
//!
//! Exposes the uniform-round debate over a small JSON API.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
