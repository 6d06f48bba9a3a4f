//! Existing-member lookup for introductions
//!
//! Identity per kind:
//! - methods and indexers: exact signature
//! - fields, properties, events: name, across all three kinds
//! - nested types: name
//!
//! The target type is searched first, then its bases nearest first. Original
//! and built members count alike. Private members of a base are not
//! inherited, and explicit interface implementations are not callable by
//! name: neither conflicts.

use crate::features::compilation::CodeModel;
use crate::features::declarations::{Declaration, DeclarationData, DeclarationKind};
use crate::features::references::DeclRef;
use crate::features::type_system::TypeSystem;
use crate::shared::models::Accessibility;

/// Member an introduction collides with
#[derive(Debug, Clone)]
pub(super) struct Existing {
    pub reference: DeclRef,
    pub declaration: Declaration,
    pub declaring_type: DeclRef,
}

impl Existing {
    pub fn is_static(&self) -> bool {
        self.declaration.is_static()
    }
}

pub(super) fn find_existing(
    model: &CodeModel,
    type_system: &dyn TypeSystem,
    target_type: &DeclRef,
    introduced: &DeclarationData,
) -> Option<Existing> {
    let target = model.logical(target_type);
    let mut owners = vec![target.clone()];
    owners.extend(model.base_chain(target_type));

    for owner in owners {
        let candidates = match introduced.kind {
            DeclarationKind::Method => {
                model.members_named(&owner, Some(DeclarationKind::Method), &introduced.name)
            }
            DeclarationKind::Indexer => model.declared_members(&owner, DeclarationKind::Indexer),
            DeclarationKind::Field | DeclarationKind::Property | DeclarationKind::Event => model
                .members_named(&owner, None, &introduced.name)
                .into_iter()
                .filter(|r| model.data(r).map_or(false, |d| d.kind.is_uniquely_named()))
                .collect(),
            DeclarationKind::NamedType => {
                model.members_named(&owner, Some(DeclarationKind::NamedType), &introduced.name)
            }
            _ => Vec::new(),
        };

        for reference in candidates {
            let Ok(declaration) = model.resolve(&reference) else {
                continue;
            };
            let Some(data) = declaration.data() else {
                continue;
            };
            if data.explicit_interface.is_some()
                || (owner != target && data.accessibility == Accessibility::Private)
            {
                continue;
            }
            if introduced.kind.has_signature() && !type_system.signatures_equal(data, introduced) {
                continue;
            }
            return Some(Existing {
                reference,
                declaration,
                declaring_type: owner,
            });
        }
    }
    None
}
