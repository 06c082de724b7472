//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the dashboard tabs and the route guard. They receive
//! the API client or auth context as props from the page that mounts them and
//! keep their own request state in local signals.

pub mod charts_panel;
pub mod history_panel;
pub mod insights_panel;
pub mod loading_spinner;
pub mod protected_routes;
pub mod tax_reminders;
pub mod upload_panel;
