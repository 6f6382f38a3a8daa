//! Shared test fixtures for the nexrad-level2 workspace.
//!
//! Builds synthetic Archive II byte streams (radial messages, bzip2 LDM
//! segments, volume headers, and realtime chunk payloads) with
//! deterministic, verifiable sample patterns, so decode and reassembly
//! tests across the workspace exercise the same wire format.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
