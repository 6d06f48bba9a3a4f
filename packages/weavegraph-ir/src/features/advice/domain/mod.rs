mod advice;
mod output;
mod strategy;

pub use advice::{Advice, AdviceKind, InitializerPosition, InterfaceMemberSpec};
pub use output::{AdviceOutput, AdviceResult};
pub use strategy::{InterfaceOverrideStrategy, OverrideStrategy};
