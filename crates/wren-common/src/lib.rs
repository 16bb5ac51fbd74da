//! Common utilities for the Wren rendering engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated, colored terminal diagnostics

pub mod warning;
