//! Common test utilities for weavegraph-ir
//!
//! Baseline fixtures, one-shot weaving helpers and assertions shared by the
//! integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;

pub use assertions::*;
pub use fixtures::*;
