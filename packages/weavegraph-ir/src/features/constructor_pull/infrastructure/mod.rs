mod strategies;

pub use strategies::{parameter_name_for, AppendParameterStrategy, NeverPullStrategy};
