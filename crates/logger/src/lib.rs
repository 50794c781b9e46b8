//! Tracing setup shared by the webguard binaries.

mod subscriber;

pub use subscriber::{LOG_FORMAT_VAR, LogFormat, init_tracing, init_tracing_with};
