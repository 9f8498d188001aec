//! Help-desk interactive core.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server half (`routes`, `services`, `db`, `state`) exposes the vote and
//! dashboard-counter endpoints. The `client` half holds the behaviours the
//! ticket pages run against those endpoints: vote controls, toasts, stats
//! polling, debounced search, form and upload guards, and keyboard shortcuts.
//! Page rendering itself stays behind the view traits in `client`.

pub mod client;
pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;
