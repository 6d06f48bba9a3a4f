//! Type system collaborator
//!
//! The engine asks three questions of the host type system: do two members
//! have the same signature, does one type convert to another, and can a
//! member be overridden. [`StructuralTypeSystem`] answers them from the code
//! model alone.

mod ports;
mod structural;

pub use ports::TypeSystem;
pub use structural::StructuralTypeSystem;
