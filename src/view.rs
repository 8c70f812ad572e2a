//! Read-side snapshot shared by every derived view.
//!
//! A [`Snapshot`] pins one [`StoreState`] together with the interner, the
//! well-known vocabulary and the prefix map. Classification, list
//! reconstruction, axioms and summaries are all computed from a snapshot, so
//! they can run in parallel with ingestion and always see one consistent state.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::OntoResult;
use crate::interner::TermInterner;
use crate::prefix::PrefixMap;
use crate::statement::{Statement, StatementKey};
use crate::store::{Scan, ScanFilter, StoreState};
use crate::term::{TermId, TermKind};
use crate::vocab::Vocabulary;

/// A consistent, immutable read handle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    state: Arc<StoreState>,
    interner: Arc<TermInterner>,
    vocab: Arc<Vocabulary>,
    prefixes: Arc<PrefixMap>,
}

impl Snapshot {
    pub(crate) fn new(
        state: Arc<StoreState>,
        interner: Arc<TermInterner>,
        vocab: Arc<Vocabulary>,
        prefixes: Arc<PrefixMap>,
    ) -> Self {
        Self {
            state,
            interner,
            vocab,
            prefixes,
        }
    }

    /// The pinned store state.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// The interner the ids in this snapshot come from.
    pub fn interner(&self) -> &TermInterner {
        &self.interner
    }

    /// Ids of the well-known vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Prefix declarations used to contract IRIs at ingest.
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Number of statements in the snapshot.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether the snapshot holds no statements.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Resolve a term id to its lexical form.
    pub fn resolve(&self, id: TermId) -> OntoResult<String> {
        self.interner.resolve(id)
    }

    /// Find the id of a node-position term, accepting full IRIs or CURIEs.
    pub fn node_id(&self, lexical: &str) -> Option<TermId> {
        self.interner
            .lookup_node(&self.prefixes.contract(lexical))
            .or_else(|| self.interner.lookup_node(lexical))
    }

    /// Kind of a term.
    pub fn kind(&self, id: TermId) -> OntoResult<TermKind> {
        self.interner.kind(id)
    }

    /// Scan by interned ids.
    pub fn scan_ids(&self, filter: ScanFilter) -> Scan<'_> {
        self.state.scan(filter)
    }

    /// Lazy scan filtered by optional predicate and subject, in lexical form.
    ///
    /// A filter naming a term that was never ingested yields nothing.
    pub fn scan(&self, predicate: Option<&str>, subject: Option<&str>) -> Statements<'_> {
        let mut filter = ScanFilter::all();
        let mut unknown = false;
        if let Some(p) = predicate {
            match self.node_id(p) {
                Some(id) => filter = filter.predicate(id),
                None => unknown = true,
            }
        }
        if let Some(s) = subject {
            match self.node_id(s) {
                Some(id) => filter = filter.subject(id),
                None => unknown = true,
            }
        }
        Statements {
            inner: (!unknown).then(|| self.state.scan(filter)),
            snapshot: self,
        }
    }

    /// Convert an interned statement back to lexical form.
    pub fn statement(&self, key: &StatementKey) -> OntoResult<Statement> {
        lexical_statement(&self.interner, key)
    }

    /// Every distinct subject: the node set.
    pub fn nodes(&self) -> BTreeSet<TermId> {
        self.state.subjects()
    }

    /// Sorted, distinct objects of `subject predicate ?o`.
    pub fn objects(&self, subject: TermId, predicate: TermId) -> Vec<TermId> {
        let set: BTreeSet<TermId> = self
            .state
            .scan(ScanFilter::all().subject(subject).predicate(predicate))
            .filter_map(|k| k.object)
            .collect();
        set.into_iter().collect()
    }

    /// Sorted, distinct objects or values of `subject predicate ?x`.
    pub fn targets(&self, subject: TermId, predicate: TermId) -> Vec<TermId> {
        let set: BTreeSet<TermId> = self
            .state
            .scan(ScanFilter::all().subject(subject).predicate(predicate))
            .filter_map(|k| k.target())
            .collect();
        set.into_iter().collect()
    }
}

/// Resolve every column of an interned statement.
pub(crate) fn lexical_statement(interner: &TermInterner, key: &StatementKey) -> OntoResult<Statement> {
    let opt = |id: Option<TermId>| id.map(|id| interner.resolve(id)).transpose();
    Ok(Statement {
        stanza: interner.resolve(key.stanza)?,
        subject: interner.resolve(key.subject)?,
        predicate: interner.resolve(key.predicate)?,
        object: opt(key.object)?,
        value: opt(key.value)?,
        datatype: opt(key.datatype)?,
        language: opt(key.language)?,
    })
}

/// Lexical statements produced by [`Snapshot::scan`].
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    inner: Option<Scan<'a>>,
    snapshot: &'a Snapshot,
}

impl Iterator for Statements<'_> {
    type Item = OntoResult<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.inner.as_mut()?.next()?;
        Some(self.snapshot.statement(key))
    }
}
