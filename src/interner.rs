//! Term interner: bidirectional lexical ↔ id mapping.
//!
//! The [`TermInterner`] provides O(1) lookups in both directions using two
//! `DashMap`s. The reverse key is the `(kind, lexical)` pair, so the literal
//! `"ex:A"` and the IRI `ex:A` are distinct terms.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{OntoResult, TermError};
use crate::term::{AtomicTermAllocator, Term, TermId, TermKind};

/// Bidirectional term interner.
///
/// Interning is idempotent: the same `(lexical, kind)` pair always returns the
/// id it was first given. Ids are dense and stable for the interner's lifetime.
pub struct TermInterner {
    /// Forward map: TermId → Term (source of truth).
    id_to_term: DashMap<TermId, Term>,
    /// Reverse map: (kind, lexical) → TermId.
    lexical_to_id: DashMap<(TermKind, String), TermId>,
    allocator: AtomicTermAllocator,
}

impl TermInterner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self {
            id_to_term: DashMap::new(),
            lexical_to_id: DashMap::new(),
            allocator: AtomicTermAllocator::new(),
        }
    }

    /// Intern a term, returning its existing id if already seen.
    pub fn intern(&self, lexical: &str, kind: TermKind) -> OntoResult<TermId> {
        if let Some(id) = self.lexical_to_id.get(&(kind, lexical.to_owned())) {
            return Ok(*id.value());
        }
        // The entry lock makes concurrent interning of one lexical form race-free.
        match self.lexical_to_id.entry((kind, lexical.to_owned())) {
            Entry::Occupied(e) => Ok(*e.get()),
            Entry::Vacant(e) => {
                let id = self.allocator.next_id()?;
                self.id_to_term.insert(
                    id,
                    Term {
                        id,
                        lexical: lexical.to_owned(),
                        kind,
                    },
                );
                e.insert(id);
                Ok(id)
            }
        }
    }

    /// Intern a subject/object lexical form, inferring IRI vs blank node.
    pub fn intern_node(&self, lexical: &str) -> OntoResult<TermId> {
        self.intern(lexical, TermKind::of_node(lexical))
    }

    /// Look up an already-interned term without creating it.
    pub fn lookup(&self, lexical: &str, kind: TermKind) -> Option<TermId> {
        self.lexical_to_id
            .get(&(kind, lexical.to_owned()))
            .map(|r| *r.value())
    }

    /// Look up a node-position lexical form without creating it.
    pub fn lookup_node(&self, lexical: &str) -> Option<TermId> {
        self.lookup(lexical, TermKind::of_node(lexical))
    }

    /// Resolve an id back to its lexical form.
    pub fn resolve(&self, id: TermId) -> OntoResult<String> {
        self.id_to_term
            .get(&id)
            .map(|r| r.value().lexical.clone())
            .ok_or_else(|| self.unknown(id))
    }

    /// Resolve an id to its full term record.
    pub fn term(&self, id: TermId) -> OntoResult<Term> {
        self.id_to_term
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| self.unknown(id))
    }

    /// Kind of an interned term.
    pub fn kind(&self, id: TermId) -> OntoResult<TermKind> {
        self.id_to_term
            .get(&id)
            .map(|r| r.value().kind)
            .ok_or_else(|| self.unknown(id))
    }

    /// Number of interned terms.
    pub fn len(&self) -> usize {
        self.id_to_term.len()
    }

    /// Whether the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.id_to_term.is_empty()
    }

    fn unknown(&self, id: TermId) -> crate::error::OntoError {
        TermError::UnknownTerm {
            id: id.get(),
            issued: self.allocator.issued(),
        }
        .into()
    }
}

impl Default for TermInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TermInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermInterner")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OntoError;

    #[test]
    fn intern_is_idempotent() {
        let interner = TermInterner::new();
        let a = interner.intern("ex:A", TermKind::Iri).unwrap();
        let again = interner.intern("ex:A", TermKind::Iri).unwrap();
        assert_eq!(a, again);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn kind_is_part_of_identity() {
        let interner = TermInterner::new();
        let iri = interner.intern("ex:A", TermKind::Iri).unwrap();
        let lit = interner.intern("ex:A", TermKind::Literal).unwrap();
        assert_ne!(iri, lit);
        assert_eq!(interner.kind(lit).unwrap(), TermKind::Literal);
    }

    #[test]
    fn resolve_round_trips_lexical() {
        let interner = TermInterner::new();
        let b = interner.intern_node("_:b1").unwrap();
        assert_eq!(interner.resolve(b).unwrap(), "_:b1");
        assert_eq!(interner.kind(b).unwrap(), TermKind::Blank);
    }

    #[test]
    fn ids_are_dense() {
        let interner = TermInterner::new();
        let ids: Vec<u64> = ["ex:A", "ex:B", "ex:C"]
            .iter()
            .map(|l| interner.intern_node(l).unwrap().get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn resolving_unissued_id_fails() {
        let interner = TermInterner::new();
        interner.intern_node("ex:A").unwrap();
        let err = interner.resolve(TermId::new(99).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            OntoError::Term(TermError::UnknownTerm { id: 99, issued: 1 })
        ));
    }

    #[test]
    fn lookup_does_not_create() {
        let interner = TermInterner::new();
        assert!(interner.lookup_node("ex:missing").is_none());
        assert!(interner.is_empty());
    }

    #[test]
    fn concurrent_interning_agrees() {
        use std::sync::Arc;
        let interner = Arc::new(TermInterner::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interner = Arc::clone(&interner);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|i| interner.intern_node(&format!("ex:T{i}")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<Vec<TermId>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        assert_eq!(interner.len(), 50);
    }
}
