//! Baseline: the original, immutable declarations
//!
//! Shared through `Arc` by every snapshot derived from it. Identity of an
//! Original declaration is its `DeclId`, stable across those snapshots.

use crate::features::declarations::{
    DeclarationData, DeclarationKind, InitializerKind, TypeKind,
};
use crate::features::references::DeclRef;
use crate::shared::models::DeclId;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Baseline {
    declarations: Vec<Arc<DeclarationData>>,
    /// Container -> children, in declaration order
    children: FxHashMap<DeclId, Vec<DeclId>>,
    roots: Vec<DeclId>,
}

impl Baseline {
    pub fn get(&self, id: DeclId) -> Option<&Arc<DeclarationData>> {
        self.declarations.get(id.index())
    }

    pub fn children(&self, container: DeclId) -> &[DeclId] {
        self.children
            .get(&container)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Top-level declarations (usually namespaces)
    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Arc<DeclarationData>)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d))
    }
}

/// Incremental baseline construction
///
/// `build` completes the baseline the way a compiler would see it:
/// 1. classes and structs without an instance constructor get an implicit one
/// 2. constructors chaining to `base(...)`/`this(...)` without an explicit
///    target are bound to the matching constructor by arity
#[derive(Debug, Default)]
pub struct BaselineBuilder {
    declarations: Vec<DeclarationData>,
}

impl BaselineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level declaration
    pub fn add(&mut self, data: DeclarationData) -> DeclId {
        self.declarations.push(data);
        DeclId((self.declarations.len() - 1) as u32)
    }

    /// Add a declaration inside `container`
    pub fn add_in(&mut self, container: DeclId, mut data: DeclarationData) -> DeclId {
        data.containing = Some(DeclRef::Original(container));
        self.add(data)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut DeclarationData> {
        self.declarations.get_mut(id.index())
    }

    pub fn build(mut self) -> Arc<Baseline> {
        self.add_implicit_constructors();

        let mut children: FxHashMap<DeclId, Vec<DeclId>> = FxHashMap::default();
        let mut roots = Vec::new();
        for (i, data) in self.declarations.iter().enumerate() {
            let id = DeclId(i as u32);
            match data.containing.as_ref().and_then(DeclRef::as_original) {
                Some(container) => children.entry(container).or_default().push(id),
                None => roots.push(id),
            }
        }

        self.bind_initializer_targets(&children);

        debug!(
            declarations = self.declarations.len(),
            roots = roots.len(),
            "baseline built"
        );

        Arc::new(Baseline {
            declarations: self.declarations.into_iter().map(Arc::new).collect(),
            children,
            roots,
        })
    }

    fn add_implicit_constructors(&mut self) {
        let mut missing = Vec::new();
        for (i, data) in self.declarations.iter().enumerate() {
            let needs_ctor = matches!(data.type_kind(), Some(TypeKind::Class | TypeKind::Struct))
                && !data.is_static();
            if !needs_ctor {
                continue;
            }
            let container = DeclRef::Original(DeclId(i as u32));
            let has_ctor = self.declarations.iter().any(|d| {
                d.kind == DeclarationKind::Constructor
                    && !d.is_static()
                    && d.containing.as_ref() == Some(&container)
            });
            if !has_ctor {
                missing.push(DeclId(i as u32));
            }
        }
        for ty in missing {
            self.add_in(ty, DeclarationData::implicit_constructor());
        }
    }

    fn bind_initializer_targets(&mut self, children: &FxHashMap<DeclId, Vec<DeclId>>) {
        let instance_ctors = |decls: &[DeclarationData], ty: DeclId| -> Vec<DeclId> {
            children
                .get(&ty)
                .map(|c| {
                    c.iter()
                        .copied()
                        .filter(|id| {
                            let d = &decls[id.index()];
                            d.kind == DeclarationKind::Constructor && !d.is_static()
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut bindings = Vec::new();
        for (i, data) in self.declarations.iter().enumerate() {
            let Some(init) = data.initializer.as_ref() else {
                continue;
            };
            if init.target.is_some() || data.is_static() {
                continue;
            }
            let Some(owner) = data.containing.as_ref().and_then(DeclRef::as_original) else {
                continue;
            };
            let search_in = match init.kind {
                InitializerKind::None => continue,
                InitializerKind::This => Some(owner),
                InitializerKind::Base => self.declarations[owner.index()]
                    .type_shape
                    .as_ref()
                    .and_then(|s| s.base_type.as_ref())
                    .and_then(|b| b.definition())
                    .and_then(DeclRef::as_original),
            };
            let Some(search_in) = search_in else {
                continue;
            };
            let arity = init.arguments.len();
            let target = instance_ctors(&self.declarations, search_in)
                .into_iter()
                .find(|c| {
                    *c != DeclId(i as u32) && self.declarations[c.index()].parameters.len() == arity
                });
            if let Some(target) = target {
                bindings.push((i, target));
            }
        }

        for (i, target) in bindings {
            if let Some(init) = self.declarations[i].initializer.as_mut() {
                init.target = Some(DeclRef::Original(target));
            }
        }
    }
}
