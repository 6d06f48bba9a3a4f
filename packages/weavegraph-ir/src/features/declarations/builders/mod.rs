//! Builders for Built declarations
//!
//! Two-phase contract:
//! 1. construction with minimal identity (container, name), so other code can
//!    hold a stable `DeclRef::Built` before anything else is known
//! 2. `initialize`: copies signature, accessibility, staticity and forwarded
//!    attributes from the template and reports invalid combinations
//!
//! A builder becomes visible outside its advice only once sealed.

mod arena;
mod common;
mod members;
mod types;

pub use arena::BuilderArena;
pub use common::{BuilderCore, BuilderInitContext};
pub use members::{ConstructorBuilder, EventBuilder, FieldBuilder, MethodBuilder, PropertyBuilder};
pub use types::{AttributeBuilder, NamedTypeBuilder};

use super::domain::{BuiltDeclaration, DeclarationKind};
use crate::errors::Result;
use crate::shared::models::{BuilderId, DiagnosticBag};

/// Any builder held by the arena
#[derive(Debug, Clone)]
pub enum Builder {
    Method(MethodBuilder),
    Field(FieldBuilder),
    /// Properties and indexers
    Property(PropertyBuilder),
    Event(EventBuilder),
    Constructor(ConstructorBuilder),
    Attribute(AttributeBuilder),
    NamedType(NamedTypeBuilder),
}

impl Builder {
    pub fn core(&self) -> &BuilderCore {
        match self {
            Builder::Method(b) => &b.core,
            Builder::Field(b) => &b.core,
            Builder::Property(b) => &b.core,
            Builder::Event(b) => &b.core,
            Builder::Constructor(b) => &b.core,
            Builder::Attribute(b) => &b.core,
            Builder::NamedType(b) => &b.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut BuilderCore {
        match self {
            Builder::Method(b) => &mut b.core,
            Builder::Field(b) => &mut b.core,
            Builder::Property(b) => &mut b.core,
            Builder::Event(b) => &mut b.core,
            Builder::Constructor(b) => &mut b.core,
            Builder::Attribute(b) => &mut b.core,
            Builder::NamedType(b) => &mut b.core,
        }
    }

    pub fn id(&self) -> BuilderId {
        self.core().id
    }

    pub fn kind(&self) -> DeclarationKind {
        self.core().data.kind
    }

    pub fn name(&self) -> &str {
        &self.core().data.name
    }

    pub fn initialize(
        &mut self,
        ctx: &BuilderInitContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Result<()> {
        match self {
            Builder::Method(b) => b.initialize(ctx, diagnostics),
            Builder::Field(b) => b.initialize(ctx, diagnostics),
            Builder::Property(b) => b.initialize(ctx, diagnostics),
            Builder::Event(b) => b.initialize(ctx, diagnostics),
            Builder::Constructor(b) => b.initialize(ctx, diagnostics),
            Builder::Attribute(b) => b.initialize(ctx, diagnostics),
            Builder::NamedType(b) => b.initialize(ctx, diagnostics),
        }
    }

    pub fn build(self) -> BuiltDeclaration {
        match self {
            Builder::Method(b) => b.core.build(),
            Builder::Field(b) => b.core.build(),
            Builder::Property(b) => b.core.build(),
            Builder::Event(b) => b.core.build(),
            Builder::Constructor(b) => b.core.build(),
            Builder::Attribute(b) => b.core.build(),
            Builder::NamedType(b) => b.core.build(),
        }
    }
}

macro_rules! impl_from_builder {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Builder {
                fn from(builder: $ty) -> Self {
                    Builder::$variant(builder)
                }
            }
        )*
    };
}

impl_from_builder! {
    Method => MethodBuilder,
    Field => FieldBuilder,
    Property => PropertyBuilder,
    Event => EventBuilder,
    Constructor => ConstructorBuilder,
    Attribute => AttributeBuilder,
    NamedType => NamedTypeBuilder,
}
