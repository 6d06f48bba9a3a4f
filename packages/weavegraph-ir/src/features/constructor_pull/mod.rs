//! Constructor-Pull Resolver
//!
//! Threads a newly required value (an introduced field or property marked as
//! pulled) through constructor chains: each constructor of the target type
//! gets a parameter assigned to the member, and every constructor delegating
//! to a modified one forwards a value for it, recursively.

mod graph;
pub mod infrastructure;
mod ports;
mod resolver;

pub use graph::DelegationGraph;
pub use infrastructure::{AppendParameterStrategy, NeverPullStrategy};
pub use ports::{ForwardedParameter, PullAction, PullRequest, PullSink, PullStrategy};
pub use resolver::{ConstructorPullResolver, PullContext};
