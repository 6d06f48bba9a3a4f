//! Weaving pipeline
//!
//! Drives an externally ordered list of (aspect, layer) applications:
//! 1. layer start: mutable clone of the last frozen model
//! 2. per aspect: build advices, initialize them, then resolve and fold each
//!    one in registration order
//! 3. layer end: compose deferred contracts, freeze
//!
//! An aspect whose construction or initialization fails is discarded as a
//! unit. Diagnostics from resolution only fail the advice that raised them.

mod aspect;
mod weaver;

pub use aspect::{Aspect, AspectApplication, FnAspect};
pub use weaver::{RollbackReason, RolledBackAspect, WeaveResult, Weaver};
