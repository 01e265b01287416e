//! Common test utilities for Sitedeck scenario and property tests.
//!
//! This module provides:
//! - `TestHome`: isolated server home with `webapps/`, `contexts/` and `etc/`
//! - `RecordingRouter`: request router that logs install/uninstall calls
//! - Fixtures: reusable descriptor content

#![allow(dead_code)]

pub mod fixtures;
pub mod home;
pub mod router;

pub use fixtures::*;
pub use home::*;
pub use router::*;
