//! # Vellum Common
//!
//! Logging configuration and setup shared by the Vellum crates.

pub mod logging;

pub use logging::{init_logging, init_test_logging, LogConfig, LogFormat};
