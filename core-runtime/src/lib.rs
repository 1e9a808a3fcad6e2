//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the health bridge:
//! - Logging and tracing infrastructure
//! - Bridge configuration
//! - Status event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the bridge core and the platform
//! adapters share. It establishes the logging conventions, the fail-fast
//! configuration builder, and the broadcast bus SDK adapters use to publish
//! sync status.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
