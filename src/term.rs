//! Core term types for the ontorel engine.
//!
//! Every IRI, blank node and literal that enters the store is interned once and
//! from then on identified by a [`TermId`]. The [`AtomicTermAllocator`] hands out
//! dense, monotonically increasing ids.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{OntoResult, TermError};

/// Unique, niche-optimized identifier for an interned term.
///
/// Uses `NonZeroU64` so that `Option<TermId>` is the same size as `TermId`,
/// which keeps the nullable statement columns as compact as the required ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(NonZeroU64);

impl TermId {
    /// Create a `TermId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(TermId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "term:{}", self.0)
    }
}

/// The syntactic kind of an RDF term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TermKind {
    /// A full IRI or a CURIE standing for one (`owl:Class`).
    Iri,
    /// A document-scoped blank node (`_:b0`).
    Blank,
    /// A literal lexical form, a datatype-less string or a language tag.
    Literal,
}

impl TermKind {
    /// Infer the kind of a node-position lexical form.
    ///
    /// Only blank nodes are syntactically distinguishable; anything else in a
    /// subject or object column is an IRI.
    pub fn of_node(lexical: &str) -> Self {
        if lexical.starts_with("_:") {
            TermKind::Blank
        } else {
            TermKind::Iri
        }
    }
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermKind::Iri => write!(f, "iri"),
            TermKind::Blank => write!(f, "blank"),
            TermKind::Literal => write!(f, "literal"),
        }
    }
}

/// An interned term as the interner stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier for this session.
    pub id: TermId,
    /// The original string: IRI, CURIE, blank node label or literal form.
    pub lexical: String,
    /// What kind of term this is.
    pub kind: TermKind,
}

/// Thread-safe term id allocator.
///
/// Produces monotonically increasing ids starting from 1.
#[derive(Debug)]
pub struct AtomicTermAllocator {
    next: AtomicU64,
}

impl AtomicTermAllocator {
    /// Create a new allocator that starts from id 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next term id.
    pub fn next_id(&self) -> OntoResult<TermId> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        TermId::new(raw).ok_or_else(|| TermError::AllocatorExhausted.into())
    }

    /// Return the highest id handed out so far (0 if none).
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed).saturating_sub(1)
    }
}

impl Default for AtomicTermAllocator {
    fn default() -> Self {
        Self::new()
    }
}
