//! Networking modules for the identity provider and the analysis backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` is the transport seam, `session` owns the identity session,
//! `gotrue` talks to the identity provider, `api` handles backend REST calls,
//! and `types` defines the shared wire schema.

pub mod api;
pub mod gotrue;
pub mod http;
pub mod session;
pub mod types;
