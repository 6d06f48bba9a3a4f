use crate::features::compilation::CodeModel;
use crate::features::declarations::{Declaration, DeclarationData};
use crate::shared::models::TypeRef;

pub trait TypeSystem: Send + Sync {
    /// Same name, generic arity and parameter list (types and ref kinds)
    fn signatures_equal(&self, a: &DeclarationData, b: &DeclarationData) -> bool;

    /// Identity, reference (base/interface) or boxing conversion
    fn is_implicitly_convertible(&self, model: &CodeModel, from: &TypeRef, to: &TypeRef) -> bool;

    /// Identity or reference conversion only
    fn is_reference_convertible(&self, model: &CodeModel, from: &TypeRef, to: &TypeRef) -> bool;

    fn is_overridable(&self, member: &Declaration) -> bool;
}
