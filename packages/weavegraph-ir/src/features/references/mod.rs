//! Identity & Reference Layer
//!
//! `DeclRef` is a snapshot-independent handle. Resolution against a concrete
//! model lives in [`crate::features::compilation`]; this module only defines
//! identity and equality.

mod decl_ref;

pub use decl_ref::{DanglingReferenceError, DeclRef, ParameterRef, TypeParameterRef};
