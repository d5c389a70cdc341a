//! InvokeItself – launch the clock app from a screen's primary action or
//! shortly after the screen is thumbnailed
//!
//! This crate implements the application core with:
//! - An invocation dispatcher that submits `{target, action}` requests to an
//!   invocation service and classifies the reply
//! - A deferred one-shot invoker driven by the tokio timer, with cancellable handles
//! - Locale handling that loads `<app>_<locale>` translation catalogs
//! - Pluggable trigger sources that feed UI/system events into the app
//! - A configurable target registry usable outside the host platform

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Application core modules
pub mod app;

// Re-export key types for convenience
pub use app::{AppConfig, Application};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
