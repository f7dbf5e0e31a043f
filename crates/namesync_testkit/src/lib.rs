//! # namesync testkit
//!
//! Test utilities for namesync.
//!
//! This crate provides:
//! - Record builders and canned inventories
//! - Property-based test generators for MAC address strings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use namesync_testkit::prelude::*;
//!
//! let (master, follower) = living_room_scenario();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
