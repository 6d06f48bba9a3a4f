mod built;
mod data;
mod declaration;
mod kind;

pub use built::BuiltDeclaration;
pub use data::{
    ArgumentValue, AttributeData, ConstructorInitializer, DeclarationData, InitializerKind,
    ParameterData, TypeShape,
};
pub use declaration::Declaration;
pub use kind::{DeclarationKind, TypeKind};
