//! Snapshot / Overlay Store
//!
//! A code model is a view {baseline, ordered transformation log}. The
//! baseline is shared; the log and the overlay maps derived from it belong to
//! one snapshot.

pub mod domain;
pub mod infrastructure;
mod model;
mod snapshot;

pub use domain::{
    Accessor, Baseline, BaselineBuilder, InsertPosition, Observability, Statement, Transformation,
    TransformationKind,
};
pub use model::CodeModel;
pub use snapshot::{CompilationModel, MutableCompilationModel};
