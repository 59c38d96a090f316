//! Domain logic between the HTTP handlers and the data API.
//! - Pure data reshaping lives here (forms, payloads, diffs, summaries);
//!   handlers stay thin and the data API client stays dumb.
//! - Everything is exercised against scripted `DataApi` implementations in
//!   tests; nothing here performs I/O except through that trait.

pub mod audit_trail;
pub mod dates;
pub mod diff;
pub mod forms;
pub mod notify;
pub mod payload;
pub mod status;
pub mod users;
