//! Frozen and accumulating snapshots
//!
//! Type-state pair over one [`CodeModel`]:
//! - [`CompilationModel`]: frozen, shared, `Send + Sync`; indexes are primed
//!   lazily behind a `parking_lot::RwLock`
//! - [`MutableCompilationModel`]: owned by one pipeline, receives
//!   transformations
//!
//! Cloning either way copies the overlay maps and every primed index, so a
//! clone never starts cold and never sees stale entries.

use super::domain::{Baseline, Transformation};
use super::model::CodeModel;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CompilationModel {
    inner: Arc<CodeModel>,
}

impl CompilationModel {
    pub fn new(baseline: Arc<Baseline>) -> Self {
        Self {
            inner: Arc::new(CodeModel::new(baseline)),
        }
    }

    pub fn create_mutable_clone(&self) -> MutableCompilationModel {
        MutableCompilationModel {
            model: (*self.inner).clone(),
        }
    }

    pub fn model(&self) -> &CodeModel {
        &self.inner
    }
}

impl Deref for CompilationModel {
    type Target = CodeModel;

    fn deref(&self) -> &CodeModel {
        &self.inner
    }
}

#[derive(Debug, Clone)]
pub struct MutableCompilationModel {
    model: CodeModel,
}

impl MutableCompilationModel {
    pub fn new(baseline: Arc<Baseline>) -> Self {
        Self {
            model: CodeModel::new(baseline),
        }
    }

    /// Append to the log and keep primed indexes current
    pub fn add_transformation(&mut self, transformation: Transformation) {
        self.model.apply(transformation);
    }

    pub fn add_transformations(&mut self, transformations: impl IntoIterator<Item = Transformation>) {
        for transformation in transformations {
            self.add_transformation(transformation);
        }
    }

    pub fn create_immutable_clone(&self) -> CompilationModel {
        debug!(transformations = self.model.log().len(), "freezing model");
        CompilationModel {
            inner: Arc::new(self.model.clone()),
        }
    }

    pub fn into_immutable(self) -> CompilationModel {
        CompilationModel {
            inner: Arc::new(self.model),
        }
    }

    pub fn model(&self) -> &CodeModel {
        &self.model
    }
}

impl Deref for MutableCompilationModel {
    type Target = CodeModel;

    fn deref(&self) -> &CodeModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::compilation::{BaselineBuilder, TransformationKind};
    use crate::features::declarations::{BuiltDeclaration, DeclarationData, DeclarationKind};
    use crate::features::references::DeclRef;
    use crate::shared::models::{AdviceId, BuilderId, TransformationOrder, TypeRef};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_frozen_model_is_send_sync() {
        assert_send_sync::<CompilationModel>();
    }

    #[test]
    fn test_clone_does_not_leak_back() {
        let mut b = BaselineBuilder::new();
        let c = b.add(DeclarationData::class("C"));
        let frozen = CompilationModel::new(b.build());
        let c_ref = DeclRef::Original(c);

        // prime before cloning
        assert!(frozen.declared_members(&c_ref, DeclarationKind::Method).is_empty());

        let mut mutable = frozen.create_mutable_clone();
        let mut data = DeclarationData::method("Foo", TypeRef::void());
        data.containing = Some(c_ref.clone());
        mutable.add_transformation(Transformation::new(
            TransformationOrder(1),
            AdviceId(0),
            TransformationKind::IntroduceDeclaration {
                declaration: Arc::new(BuiltDeclaration {
                    id: BuilderId::new(0, 0),
                    advice: AdviceId(0),
                    data,
                    overridden_member: None,
                    replaces: None,
                    interface_member: None,
                    attributes: Vec::new(),
                }),
            },
        ));

        assert_eq!(mutable.declared_members(&c_ref, DeclarationKind::Method).len(), 1);
        assert!(frozen.declared_members(&c_ref, DeclarationKind::Method).is_empty());

        let refrozen = mutable.create_immutable_clone();
        assert_eq!(refrozen.declared_members(&c_ref, DeclarationKind::Method).len(), 1);
        assert_eq!(refrozen.log().len(), 1);
    }
}
