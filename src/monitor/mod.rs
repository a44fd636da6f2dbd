//! Monitoring views over the shared frontier
//!
//! Read-only queries for operators: aggregate counts and recent records,
//! rendered for the terminal. Nothing in here mutates the store.

mod status;

pub use status::{format_status, load_status, show_status, StatusReport};
