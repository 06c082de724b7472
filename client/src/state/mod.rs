//! Client application state and view models.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` and `gate` hold the process-wide authentication state and route
//! gating rules; the remaining modules turn backend payloads into the plain
//! data the dashboard components render.

pub mod auth;
pub mod charts;
pub mod gate;
pub mod history;
pub mod insights;
pub mod reminders;
pub mod ui;
pub mod upload;
