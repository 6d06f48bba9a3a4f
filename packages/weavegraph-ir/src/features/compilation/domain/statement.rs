//! Statements produced by the engine
//!
//! The engine does not emit source text. It records which template snippets
//! go where, and the glue (temporary capture, original call, assignment)
//! around them.

use crate::features::references::DeclRef;
use crate::features::templates::TemplateRef;
use crate::shared::models::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Expanded template text
    Snippet(String),
    /// Template left for the emitter to expand in place
    Template(TemplateRef),
    /// `var {temporary} = <original call>;`
    CaptureOriginal { temporary: String, ty: TypeRef },
    /// `return <original call>;` or `<original call>;` for void
    InvokeOriginal { tail_return: bool },
    /// `return {temporary};`
    ReturnTemporary(String),
    /// `{member} = {parameter};`
    AssignFromParameter { member: DeclRef, parameter: String },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Snippet(text) => write!(f, "{}", text),
            Statement::Template(template) => write!(f, "<{}>", template),
            Statement::CaptureOriginal { temporary, .. } => {
                write!(f, "var {} = <original>;", temporary)
            }
            Statement::InvokeOriginal { tail_return: true } => write!(f, "return <original>;"),
            Statement::InvokeOriginal { tail_return: false } => write!(f, "<original>;"),
            Statement::ReturnTemporary(name) => write!(f, "return {};", name),
            Statement::AssignFromParameter { member, parameter } => {
                write!(f, "{} = {};", member, parameter)
            }
        }
    }
}

/// Where inserted statements go relative to the target body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsertPosition {
    /// Start of the body, after any constructor initializer
    BeforeBody,
}

/// Property accessor a composed body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessor {
    Get,
    Set,
}
