//! Interactive behaviours for the help-desk pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each component receives the views it drives at construction, as trait
//! objects, instead of looking elements up on its own. Timers (debounce,
//! polling, toast dismissal) are tokio tasks owned by the component that
//! started them and aborted by its `stop`/`Drop`. Network calls go through
//! `net::HelpdeskApi`.

pub mod connectivity;
pub mod keyboard;
pub mod net;
pub mod search;
pub mod stats;
pub mod toast;
pub mod upload;
pub mod validation;
pub mod vote;

// =============================================================================
// TEST HELPERS
// =============================================================================
