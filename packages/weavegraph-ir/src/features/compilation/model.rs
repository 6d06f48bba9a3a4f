//! Code model: baseline + ordered transformation log
//!
//! One type backs both snapshot kinds. [`CompilationModel`] shares it
//! read-only; [`MutableCompilationModel`] owns it and folds transformations
//! in. Folding keeps every primed index current.
//!
//! [`CompilationModel`]: super::CompilationModel
//! [`MutableCompilationModel`]: super::MutableCompilationModel

use super::domain::{Accessor, Baseline, Statement, Transformation, TransformationKind};
use super::infrastructure::{IndexKey, MemberIndex, Position};
use crate::features::declarations::{
    ArgumentValue, AttributeData, BuiltDeclaration, ConstructorInitializer, Declaration,
    DeclarationData, DeclarationKind, InitializerKind, ParameterData,
};
use crate::features::references::{DanglingReferenceError, DeclRef};
use crate::shared::models::{BuilderId, TransformationOrder, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct CodeModel {
    baseline: Arc<Baseline>,
    log: Vec<Arc<Transformation>>,

    /// Every sealed declaration, by builder id
    built: FxHashMap<BuilderId, Arc<BuiltDeclaration>>,
    /// Logical ref -> most recent declaration standing in for it
    replacements: FxHashMap<DeclRef, Arc<BuiltDeclaration>>,
    /// Container -> introduced (non-replacing) built children
    built_children: FxHashMap<DeclRef, Vec<DeclRef>>,
    built_types: Vec<DeclRef>,
    /// Sequence of introduction, for index ordering
    introduced_at: FxHashMap<DeclRef, u64>,
    removed: FxHashSet<DeclRef>,

    introduced_parameters: FxHashMap<DeclRef, Vec<ParameterData>>,
    introduced_interfaces: FxHashMap<DeclRef, Vec<TypeRef>>,
    /// Type -> (interface member, implementing member)
    interface_implementations: FxHashMap<DeclRef, Vec<(DeclRef, DeclRef)>>,
    initializer_arguments: FxHashMap<DeclRef, Vec<(u16, ArgumentValue)>>,
    /// Forwarded attributes of built declarations that were removed
    suppressed_attributes: FxHashSet<(DeclRef, TypeRef)>,

    index: MemberIndex,
}

impl CodeModel {
    pub fn new(baseline: Arc<Baseline>) -> Self {
        Self {
            baseline,
            log: Vec::new(),
            built: FxHashMap::default(),
            replacements: FxHashMap::default(),
            built_children: FxHashMap::default(),
            built_types: Vec::new(),
            introduced_at: FxHashMap::default(),
            removed: FxHashSet::default(),
            introduced_parameters: FxHashMap::default(),
            introduced_interfaces: FxHashMap::default(),
            interface_implementations: FxHashMap::default(),
            initializer_arguments: FxHashMap::default(),
            suppressed_attributes: FxHashSet::default(),
            index: MemberIndex::new(),
        }
    }

    pub fn baseline(&self) -> &Arc<Baseline> {
        &self.baseline
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Resolution
    // ═══════════════════════════════════════════════════════════════════════

    /// Resolve a ref to the declaration visible in this model
    pub fn resolve(&self, reference: &DeclRef) -> Result<Declaration, DanglingReferenceError> {
        self.try_resolve(reference)
            .ok_or_else(|| DanglingReferenceError::new(reference.clone()))
    }

    fn try_resolve(&self, reference: &DeclRef) -> Option<Declaration> {
        match reference {
            DeclRef::Original(id) => {
                if self.removed.contains(reference) {
                    return None;
                }
                if let Some(built) = self.replacements.get(reference) {
                    return Some(Declaration::Built(Arc::clone(built)));
                }
                let data = self.baseline.get(*id)?;
                Some(Declaration::Original {
                    id: *id,
                    data: Arc::clone(data),
                })
            }
            DeclRef::Built(id) => {
                if self.removed.contains(reference) {
                    return None;
                }
                if let Some(built) = self.replacements.get(reference) {
                    return Some(Declaration::Built(Arc::clone(built)));
                }
                let built = self.built.get(id)?;
                // A superseded replacement resolves to the latest one
                if let Some(latest) = built.replaces.as_ref().and_then(|r| self.replacements.get(r)) {
                    return Some(Declaration::Built(Arc::clone(latest)));
                }
                Some(Declaration::Built(Arc::clone(built)))
            }
            DeclRef::Parameter(p) => {
                let parameters = self.parameters(&p.member);
                let declared = self.try_resolve(&p.member)?.data()?.parameters.len();
                let data = parameters.get(p.index as usize)?.clone();
                Some(Declaration::Parameter {
                    member: (*p.member).clone(),
                    index: p.index,
                    data,
                    introduced: p.index as usize >= declared,
                })
            }
            DeclRef::TypeParameter(tp) => {
                let owner = self.try_resolve(&tp.owner)?;
                let name = owner.data()?.type_parameters.get(tp.position as usize)?.clone();
                Some(Declaration::TypeParameter {
                    owner: (*tp.owner).clone(),
                    owner_kind: tp.owner_kind,
                    position: tp.position,
                    name,
                })
            }
        }
    }

    pub fn contains(&self, reference: &DeclRef) -> bool {
        self.try_resolve(reference).is_some()
    }

    /// Logical ref of whatever `reference` resolves to
    pub fn logical(&self, reference: &DeclRef) -> DeclRef {
        self.try_resolve(reference)
            .map(|d| d.to_ref())
            .unwrap_or_else(|| reference.clone())
    }

    /// Declaration data for members and types
    pub fn data(&self, reference: &DeclRef) -> Option<DeclarationData> {
        self.try_resolve(reference).and_then(|d| d.data().cloned())
    }

    pub fn built(&self, id: BuilderId) -> Option<&Arc<BuiltDeclaration>> {
        self.built.get(&id)
    }

    /// One past the highest builder index used by a folded declaration
    pub fn builder_watermark(&self) -> u32 {
        self.built.keys().map(|id| id.index + 1).max().unwrap_or(0)
    }

    fn position(&self, reference: &DeclRef) -> Position {
        match reference {
            DeclRef::Original(id) => (0, id.0 as u64),
            _ => (
                1,
                self.introduced_at.get(reference).copied().unwrap_or(u64::MAX),
            ),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Folding
    // ═══════════════════════════════════════════════════════════════════════

    /// Fold one transformation into the model
    pub(super) fn apply(&mut self, transformation: Transformation) {
        if let Some(last) = self.log.last() {
            assert!(
                transformation.order > last.order,
                "transformation order must be strictly increasing ({} after {})",
                transformation.order,
                last.order
            );
        }

        trace!(
            order = %transformation.order,
            advice = %transformation.advice,
            kind = transformation.kind.name(),
            "folding transformation"
        );

        match &transformation.kind {
            TransformationKind::IntroduceDeclaration { declaration } => {
                self.fold_declaration(declaration, transformation.order);
            }
            TransformationKind::IntroduceParameter { member, parameter } => {
                let key = self.logical(member);
                self.introduced_parameters
                    .entry(key)
                    .or_default()
                    .push(parameter.clone());
            }
            TransformationKind::IntroduceInterface {
                target_type,
                interface,
                implementations,
            } => {
                let key = self.logical(target_type);
                self.introduced_interfaces
                    .entry(key.clone())
                    .or_default()
                    .push(interface.clone());
                self.interface_implementations
                    .entry(key)
                    .or_default()
                    .extend(implementations.iter().cloned());
            }
            TransformationKind::RemoveAttributes {
                target,
                attribute_type,
            } => {
                self.fold_attribute_removal(target, attribute_type);
            }
            TransformationKind::IntroduceConstructorInitializerArgument {
                constructor,
                parameter_index,
                value,
            } => {
                let key = self.logical(constructor);
                self.initializer_arguments
                    .entry(key)
                    .or_default()
                    .push((*parameter_index, value.clone()));
            }
            TransformationKind::OverrideMember { .. }
            | TransformationKind::InsertStatements { .. }
            | TransformationKind::ApplyContracts { .. } => {}
        }

        self.log.push(Arc::new(transformation));
    }

    fn fold_declaration(&mut self, declaration: &Arc<BuiltDeclaration>, order: TransformationOrder) {
        self.built.insert(declaration.id, Arc::clone(declaration));
        let kind = declaration.data.kind;
        let name = declaration.data.name.clone();

        match &declaration.replaces {
            Some(replaced) => {
                let previous = self.try_resolve(replaced);
                self.replacements
                    .insert(replaced.clone(), Arc::clone(declaration));

                // Substitution keeps the logical ref; only a changed kind or
                // name moves it between index entries
                if let Some(previous) = previous {
                    if previous.kind() != kind || previous.name() != name {
                        if let Some(container) = previous.containing() {
                            let container = self.logical(&container);
                            let position = self.position(replaced);
                            self.index
                                .remove(&container, previous.kind(), previous.name(), replaced);
                            self.index
                                .insert(&container, kind, &name, position, replaced);
                        }
                    }
                }
            }
            None => {
                let reference = declaration.builder_ref();
                self.introduced_at.insert(reference.clone(), order.0);
                if let Some(container) = declaration.data.containing.as_ref() {
                    let container = self.logical(container);
                    let position = self.position(&reference);
                    self.built_children
                        .entry(container.clone())
                        .or_default()
                        .push(reference.clone());
                    self.index
                        .insert(&container, kind, &name, position, &reference);
                }
                if kind == DeclarationKind::NamedType {
                    self.built_types.push(reference);
                }
            }
        }
    }

    fn fold_attribute_removal(&mut self, target: &DeclRef, attribute_type: &TypeRef) {
        let target = self.logical(target);

        let matching: Vec<(DeclRef, String)> = self
            .declared_members(&target, DeclarationKind::Attribute)
            .into_iter()
            .filter_map(|r| {
                let decl = self.try_resolve(&r)?;
                let data = decl.data()?;
                (data.attribute.as_ref()?.attribute_type == *attribute_type)
                    .then(|| (r.clone(), data.name.clone()))
            })
            .collect();

        for (reference, name) in matching {
            self.index
                .remove(&target, DeclarationKind::Attribute, &name, &reference);
            self.removed.insert(reference);
        }

        if matches!(self.try_resolve(&target), Some(Declaration::Built(_))) {
            self.suppressed_attributes
                .insert((target, attribute_type.clone()));
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Member queries (index-backed)
    // ═══════════════════════════════════════════════════════════════════════

    fn compute_children<F>(&self, container: &DeclRef, keep: F) -> Vec<(Position, DeclRef)>
    where
        F: Fn(&Declaration) -> bool,
    {
        let mut out = Vec::new();
        let original = match container {
            DeclRef::Original(id) => self.baseline.children(*id),
            _ => &[],
        };
        let original = original.iter().map(|id| DeclRef::Original(*id));
        let built = self
            .built_children
            .get(container)
            .into_iter()
            .flatten()
            .cloned();

        for reference in original.chain(built) {
            if let Some(decl) = self.try_resolve(&reference) {
                if keep(&decl) {
                    out.push((self.position(&reference), reference));
                }
            }
        }
        out
    }

    /// Members of `container` of one kind
    pub fn declared_members(&self, container: &DeclRef, kind: DeclarationKind) -> Vec<DeclRef> {
        let container = self.logical(container);
        let key = IndexKey::Children {
            container: container.clone(),
            kind: Some(kind),
        };
        self.index
            .get_or_prime(key, || self.compute_children(&container, |d| d.kind() == kind))
    }

    /// Every child of `container` (members, nested types, attributes)
    pub fn children(&self, container: &DeclRef) -> Vec<DeclRef> {
        let container = self.logical(container);
        let key = IndexKey::Children {
            container: container.clone(),
            kind: None,
        };
        self.index
            .get_or_prime(key, || self.compute_children(&container, |_| true))
    }

    /// Children named `name`, of one kind or any kind
    pub fn members_named(
        &self,
        container: &DeclRef,
        kind: Option<DeclarationKind>,
        name: &str,
    ) -> Vec<DeclRef> {
        let container = self.logical(container);
        let key = IndexKey::Named {
            container: container.clone(),
            kind,
            name: name.to_string(),
        };
        self.index.get_or_prime(key, || {
            self.compute_children(&container, |d| {
                d.name() == name && kind.map_or(true, |k| d.kind() == k)
            })
        })
    }

    /// Index entries primed so far
    pub fn primed_index_len(&self) -> usize {
        self.index.primed_len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Types and hierarchy
    // ═══════════════════════════════════════════════════════════════════════

    /// All named types, baseline first
    pub fn types(&self) -> Vec<DeclRef> {
        let original = self
            .baseline
            .iter()
            .filter(|(_, d)| d.kind == DeclarationKind::NamedType)
            .map(|(id, _)| DeclRef::Original(id));
        original
            .chain(self.built_types.iter().cloned())
            .filter(|r| self.contains(r))
            .collect()
    }

    /// Type named `name` (simple name, first match)
    pub fn find_type(&self, name: &str) -> Option<DeclRef> {
        self.types()
            .into_iter()
            .find(|r| self.try_resolve(r).map_or(false, |d| d.name() == name))
    }

    pub fn base_type(&self, ty: &DeclRef) -> Option<DeclRef> {
        let data = self.data(ty)?;
        let base = data.type_shape?.base_type?;
        base.definition().map(|d| self.logical(d))
    }

    /// Base types of `ty`, nearest first
    pub fn base_chain(&self, ty: &DeclRef) -> Vec<DeclRef> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(self.logical(ty));
        let mut current = self.base_type(ty);
        while let Some(base) = current {
            if !seen.insert(base.clone()) {
                break;
            }
            current = self.base_type(&base);
            chain.push(base);
        }
        chain
    }

    /// `derived` is `base` or inherits from it
    pub fn inherits_from(&self, derived: &DeclRef, base: &DeclRef) -> bool {
        let base = self.logical(base);
        self.logical(derived) == base || self.base_chain(derived).contains(&base)
    }

    /// Types whose direct base is `ty`
    pub fn derived_types(&self, ty: &DeclRef) -> Vec<DeclRef> {
        let ty = self.logical(ty);
        self.types()
            .into_iter()
            .filter(|t| self.base_type(t).as_ref() == Some(&ty))
            .collect()
    }

    /// Interfaces listed on `ty` itself, original then introduced
    pub fn direct_interfaces(&self, ty: &DeclRef) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = self
            .data(ty)
            .and_then(|d| d.type_shape)
            .map(|s| s.interfaces)
            .unwrap_or_default();
        if let Some(introduced) = self.introduced_interfaces.get(&self.logical(ty)) {
            out.extend(introduced.iter().cloned());
        }
        out
    }

    /// Interfaces implemented by `ty`: original, inherited and introduced,
    /// closed over interface inheritance
    pub fn interfaces(&self, ty: &DeclRef) -> Vec<TypeRef> {
        let mut out: Vec<TypeRef> = Vec::new();
        let mut pending: Vec<TypeRef> = Vec::new();

        let mut owners = vec![self.logical(ty)];
        owners.extend(self.base_chain(ty));
        for owner in owners.iter().rev() {
            pending.extend(self.direct_interfaces(owner));
        }

        pending.reverse();
        while let Some(interface) = pending.pop() {
            if out.contains(&interface) {
                continue;
            }
            if let Some(definition) = interface.definition() {
                let mut parents = self.direct_interfaces(definition);
                parents.reverse();
                pending.extend(parents);
            }
            out.push(interface);
        }
        out
    }

    pub fn implements(&self, ty: &DeclRef, interface: &TypeRef) -> bool {
        self.interfaces(ty).contains(interface)
    }

    /// Member implementing `interface_member` on `ty`, when introduced
    pub fn interface_implementation(&self, ty: &DeclRef, interface_member: &DeclRef) -> Option<DeclRef> {
        self.interface_implementations
            .get(&self.logical(ty))?
            .iter()
            .find(|(i, _)| i == interface_member)
            .map(|(_, m)| m.clone())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Constructors, parameters, attributes
    // ═══════════════════════════════════════════════════════════════════════

    /// Instance constructors of `ty`
    pub fn constructors(&self, ty: &DeclRef) -> Vec<DeclRef> {
        self.declared_members(ty, DeclarationKind::Constructor)
            .into_iter()
            .filter(|c| self.try_resolve(c).map_or(false, |d| !d.is_static()))
            .collect()
    }

    pub fn static_constructor(&self, ty: &DeclRef) -> Option<DeclRef> {
        self.declared_members(ty, DeclarationKind::Constructor)
            .into_iter()
            .find(|c| self.try_resolve(c).map_or(false, |d| d.is_static()))
    }

    /// Declared parameters followed by introduced ones
    pub fn parameters(&self, member: &DeclRef) -> Vec<ParameterData> {
        let Some(decl) = self.try_resolve(member) else {
            return Vec::new();
        };
        let mut out = decl.data().map(|d| d.parameters.clone()).unwrap_or_default();
        if let Some(introduced) = self.introduced_parameters.get(&decl.to_ref()) {
            out.extend(introduced.iter().cloned());
        }
        out
    }

    /// Constructor initializer with introduced arguments in place
    pub fn initializer(&self, constructor: &DeclRef) -> Option<ConstructorInitializer> {
        let decl = self.try_resolve(constructor)?;
        let mut init = decl.data()?.initializer.clone()?;
        if let Some(extra) = self.initializer_arguments.get(&decl.to_ref()) {
            for (index, value) in extra {
                if matches!(value, ArgumentValue::Named { .. }) {
                    init.arguments.push(value.clone());
                } else {
                    let at = (*index as usize).min(init.positional_len());
                    init.arguments.insert(at, value.clone());
                }
            }
        }
        Some(init)
    }

    /// Constructors chaining to `constructor`: `this(...)` in the same type
    /// and `base(...)` in directly derived types
    pub fn delegating_constructors(&self, constructor: &DeclRef) -> Vec<DeclRef> {
        let target = self.logical(constructor);
        let Some(owner) = self.try_resolve(&target).and_then(|d| d.containing()) else {
            return Vec::new();
        };

        let mut candidates: Vec<(DeclRef, InitializerKind)> = self
            .constructors(&owner)
            .into_iter()
            .map(|c| (c, InitializerKind::This))
            .collect();
        for derived in self.derived_types(&owner) {
            candidates.extend(
                self.constructors(&derived)
                    .into_iter()
                    .map(|c| (c, InitializerKind::Base)),
            );
        }

        candidates
            .into_iter()
            .filter(|(c, kind)| {
                self.initializer(c).map_or(false, |init| {
                    init.kind == *kind
                        && init.target.as_ref().map(|t| self.logical(t)).as_ref() == Some(&target)
                })
            })
            .map(|(c, _)| c)
            .collect()
    }

    /// Attributes on `target`: forwarded ones of a built declaration first,
    /// then attribute declarations, minus removed ones
    pub fn attributes(&self, target: &DeclRef) -> Vec<AttributeData> {
        let target = self.logical(target);
        let mut out = Vec::new();

        if let Some(Declaration::Built(built)) = self.try_resolve(&target) {
            out.extend(built.attributes.iter().filter(|a| {
                !self
                    .suppressed_attributes
                    .contains(&(target.clone(), a.attribute_type.clone()))
            }).cloned());
        }

        for reference in self.declared_members(&target, DeclarationKind::Attribute) {
            if let Some(attribute) = self.data(&reference).and_then(|d| d.attribute) {
                out.push(attribute);
            }
        }
        out
    }

    pub fn has_attribute(&self, target: &DeclRef, attribute_type: &TypeRef) -> bool {
        self.attributes(target)
            .iter()
            .any(|a| a.attribute_type == *attribute_type)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Transformation log
    // ═══════════════════════════════════════════════════════════════════════

    pub fn log(&self) -> &[Arc<Transformation>] {
        &self.log
    }

    pub fn last_order(&self) -> Option<TransformationOrder> {
        self.log.last().map(|t| t.order)
    }

    /// Transformations about `target`, in order
    pub fn transformations_for(&self, target: &DeclRef) -> Vec<&Transformation> {
        let target = self.logical(target);
        self.log
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| self.logical(&t.kind.target()) == target)
            .collect()
    }

    /// Statements inserted into `target`, in order
    pub fn inserted_statements(&self, target: &DeclRef) -> Vec<Statement> {
        self.transformations_for(target)
            .into_iter()
            .filter_map(|t| match &t.kind {
                TransformationKind::InsertStatements { statements, .. } => Some(statements.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Most recent composed contract body of a method-style `target`
    pub fn contract_body(&self, target: &DeclRef) -> Option<Vec<Statement>> {
        self.latest_contracts(target, None)
    }

    /// Most recent composed contract body of one accessor of a field or property
    pub fn accessor_contract_body(&self, target: &DeclRef, accessor: Accessor) -> Option<Vec<Statement>> {
        self.latest_contracts(target, Some(accessor))
    }

    fn latest_contracts(&self, target: &DeclRef, accessor: Option<Accessor>) -> Option<Vec<Statement>> {
        self.transformations_for(target)
            .into_iter()
            .rev()
            .find_map(|t| match &t.kind {
                TransformationKind::ApplyContracts {
                    accessor: a, body, ..
                } if *a == accessor => Some(body.clone()),
                _ => None,
            })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Display names for diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    pub fn display_name(&self, reference: &DeclRef) -> String {
        match self.try_resolve(reference) {
            Some(Declaration::Parameter { member, data, .. }) => {
                format!("{}/{}", self.display_name(&member), data.name)
            }
            Some(Declaration::TypeParameter { name, .. }) => name,
            Some(decl) => match decl.data() {
                Some(data) => self.display_data(data),
                None => reference.to_string(),
            },
            None => reference.to_string(),
        }
    }

    /// Qualified name with the parameter list for signature-bearing kinds
    pub fn display_data(&self, data: &DeclarationData) -> String {
        let mut out = String::new();
        if let Some(container) = &data.containing {
            if self.contains(container) {
                out.push_str(&self.display_name(container));
                out.push('.');
            }
        }
        out.push_str(&data.name);
        if data.kind.has_signature() {
            let parameters: Vec<String> =
                data.parameters.iter().map(|p| self.display_type(&p.ty)).collect();
            out.push('(');
            out.push_str(&parameters.join(", "));
            out.push(')');
        }
        out
    }

    pub fn display_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named {
                definition,
                arguments,
            } => {
                let mut out = self.display_name(definition);
                if !arguments.is_empty() {
                    let args: Vec<String> = arguments.iter().map(|a| self.display_type(a)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                out
            }
            TypeRef::Array(element) => format!("{}[]", self.display_type(element)),
            other => other.to_string(),
        }
    }
}
