//! Core byline library (API client, session store, config).

pub mod api;
pub mod config;
pub mod logging;
pub mod session;
