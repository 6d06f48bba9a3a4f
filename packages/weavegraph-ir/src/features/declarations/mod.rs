//! Declaration Model
//!
//! Two provenances share one data shape:
//! - Original: baseline declarations, immutable, addressed by `DeclId`
//! - Built: produced by a builder, sealed into a model's transformation log
//!
//! Builders live in a generation-tagged [`BuilderArena`] until they are sealed.

pub mod builders;
pub mod domain;

pub use builders::{
    AttributeBuilder, Builder, BuilderArena, BuilderCore, BuilderInitContext, ConstructorBuilder,
    EventBuilder, FieldBuilder, MethodBuilder, NamedTypeBuilder, PropertyBuilder,
};
pub use domain::{
    ArgumentValue, AttributeData, BuiltDeclaration, ConstructorInitializer, Declaration,
    DeclarationData, DeclarationKind, InitializerKind, ParameterData, TypeKind, TypeShape,
};
