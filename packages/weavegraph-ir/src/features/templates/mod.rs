//! Template Expansion boundary
//!
//! The engine never generates bodies itself. It checks shape compatibility and
//! hands templates to a [`TemplateExpander`]. [`TextTemplateExpander`] is a
//! small reference implementation substituting `{value}` placeholders.

mod domain;
pub mod infrastructure;
mod ports;

pub use domain::{InterfaceMemberMark, TemplateMember, TemplateRef};
pub use infrastructure::TextTemplateExpander;
pub use ports::{BindingShape, BoundTemplate, ExpansionContext, TemplateError, TemplateExpander};
