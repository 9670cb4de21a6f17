//! Lifecycle and property tests for the dummy sensor plugin.
//!
//! # Test Structure
//!
//! - `lifecycle.rs`: tick-by-tick scenarios against a world, and end-to-end
//!   runs through the simulation runner
//! - `properties.rs`: the table matches the live sensor entities after any
//!   sequence of insertions, removals and ticks
//! - `helpers.rs`: rigs, mock store and tracing setup

mod helpers;
mod properties;

pub use helpers::*;
