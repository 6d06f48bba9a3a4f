//! Lazily primed member index
//!
//! Entries are computed on first query and from then on kept current by the
//! accumulating model: additions are inserted, replacements substituted and
//! removals dropped in every primed entry. An empty entry is a valid answer
//! and gets extended like any other, so there are no stale negative caches.
//!
//! Entries are ordered by [`Position`], which makes a primed-then-extended
//! entry identical to one computed fresh after the same transformations.

use crate::features::declarations::DeclarationKind;
use crate::features::references::DeclRef;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Stable ordering key: (provenance, sequence)
///
/// Original declarations come first in baseline order, built ones follow in
/// the order they were introduced.
pub type Position = (u8, u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Members of `container`, of one kind or (`None`) of every member kind
    Children {
        container: DeclRef,
        kind: Option<DeclarationKind>,
    },
    Named {
        container: DeclRef,
        kind: Option<DeclarationKind>,
        name: String,
    },
}

type Entries = Vec<(Position, DeclRef)>;

#[derive(Debug, Default)]
pub struct MemberIndex {
    primed: RwLock<FxHashMap<IndexKey, Entries>>,
}

impl Clone for MemberIndex {
    fn clone(&self) -> Self {
        Self {
            primed: RwLock::new(self.primed.read().clone()),
        }
    }
}

fn refs(entries: &Entries) -> Vec<DeclRef> {
    entries.iter().map(|(_, r)| r.clone()).collect()
}

fn keys_for(container: &DeclRef, kind: DeclarationKind, name: &str) -> [IndexKey; 4] {
    [
        IndexKey::Children {
            container: container.clone(),
            kind: Some(kind),
        },
        IndexKey::Children {
            container: container.clone(),
            kind: None,
        },
        IndexKey::Named {
            container: container.clone(),
            kind: Some(kind),
            name: name.to_string(),
        },
        IndexKey::Named {
            container: container.clone(),
            kind: None,
            name: name.to_string(),
        },
    ]
}

impl MemberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primed entry for `key`, computing it with `compute` on first use
    pub fn get_or_prime<F>(&self, key: IndexKey, compute: F) -> Vec<DeclRef>
    where
        F: FnOnce() -> Entries,
    {
        {
            let primed = self.primed.read();
            if let Some(entries) = primed.get(&key) {
                return refs(entries);
            }
        }

        let mut computed = compute();
        computed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut primed = self.primed.write();
        let entries = primed.entry(key).or_insert(computed);
        refs(entries)
    }

    pub fn is_primed(&self, key: &IndexKey) -> bool {
        self.primed.read().contains_key(key)
    }

    pub fn primed_len(&self) -> usize {
        self.primed.read().len()
    }

    /// Extend every primed entry the new member belongs to
    pub fn insert(
        &mut self,
        container: &DeclRef,
        kind: DeclarationKind,
        name: &str,
        position: Position,
        reference: &DeclRef,
    ) {
        let primed = self.primed.get_mut();
        for key in keys_for(container, kind, name) {
            if let Some(entries) = primed.get_mut(&key) {
                if entries.iter().any(|(_, r)| r == reference) {
                    continue;
                }
                let at = entries.partition_point(|(p, _)| *p < position);
                entries.insert(at, (position, reference.clone()));
            }
        }
    }

    /// Drop the member from every primed entry it belongs to
    pub fn remove(
        &mut self,
        container: &DeclRef,
        kind: DeclarationKind,
        name: &str,
        reference: &DeclRef,
    ) {
        let primed = self.primed.get_mut();
        for key in keys_for(container, kind, name) {
            if let Some(entries) = primed.get_mut(&key) {
                entries.retain(|(_, r)| r != reference);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::DeclId;

    fn children(container: DeclId, kind: DeclarationKind) -> IndexKey {
        IndexKey::Children {
            container: DeclRef::Original(container),
            kind: Some(kind),
        }
    }

    #[test]
    fn test_negative_entry_is_extended() {
        let mut index = MemberIndex::new();
        let key = IndexKey::Named {
            container: DeclRef::Original(DeclId(0)),
            kind: None,
            name: "Foo".to_string(),
        };
        assert!(index.get_or_prime(key.clone(), Vec::new).is_empty());

        let foo = DeclRef::Original(DeclId(5));
        index.insert(
            &DeclRef::Original(DeclId(0)),
            DeclarationKind::Method,
            "Foo",
            (1, 0),
            &foo,
        );
        assert_eq!(index.get_or_prime(key, Vec::new), vec![foo]);
    }

    #[test]
    fn test_unprimed_entries_stay_unprimed() {
        let mut index = MemberIndex::new();
        index.insert(
            &DeclRef::Original(DeclId(0)),
            DeclarationKind::Field,
            "x",
            (1, 0),
            &DeclRef::Original(DeclId(1)),
        );
        assert_eq!(index.primed_len(), 0);
    }

    #[test]
    fn test_insert_keeps_position_order() {
        let mut index = MemberIndex::new();
        let key = children(DeclId(0), DeclarationKind::Method);
        index.get_or_prime(key.clone(), || {
            vec![
                ((0, 1), DeclRef::Original(DeclId(1))),
                ((0, 3), DeclRef::Original(DeclId(3))),
            ]
        });
        index.insert(
            &DeclRef::Original(DeclId(0)),
            DeclarationKind::Method,
            "M2",
            (0, 2),
            &DeclRef::Original(DeclId(2)),
        );
        let got = index.get_or_prime(key.clone(), Vec::new);
        assert_eq!(
            got,
            vec![
                DeclRef::Original(DeclId(1)),
                DeclRef::Original(DeclId(2)),
                DeclRef::Original(DeclId(3)),
            ]
        );

        index.remove(
            &DeclRef::Original(DeclId(0)),
            DeclarationKind::Method,
            "M2",
            &DeclRef::Original(DeclId(2)),
        );
        assert_eq!(index.get_or_prime(key, Vec::new).len(), 2);
    }
}
