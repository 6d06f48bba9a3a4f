mod baseline;
mod statement;
mod transformation;

pub use baseline::{Baseline, BaselineBuilder};
pub use statement::{Accessor, InsertPosition, Statement};
pub use transformation::{Observability, Transformation, TransformationKind};
