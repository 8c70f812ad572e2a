//! Statement storage for ontorel.
//!
//! Two tiers serve different access patterns:
//!
//! - [`StatementStore`]: the in-memory, per-stanza statement tables that all
//!   reads go through
//! - [`durable::DurableStore`]: an optional redb database holding the lexical
//!   rows of every stanza so a data directory survives restarts
//!
//! Readers take a [`StoreState`] snapshot (an `Arc` clone) and never block
//! writers. Writers are serialized and copy-on-write the stanza they touch, so
//! a snapshot is immutable for as long as it is held.

pub mod durable;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::StoreError;
use crate::statement::StatementKey;
use crate::term::TermId;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Stanza tables
// ---------------------------------------------------------------------------

/// All statements of one stanza, in insertion order, with set semantics.
#[derive(Debug, Clone, Default)]
pub struct StanzaTable {
    rows: Vec<StatementKey>,
    members: HashSet<StatementKey>,
    by_subject: HashMap<TermId, Vec<u32>>,
    by_predicate: HashMap<TermId, Vec<u32>>,
}

impl StanzaTable {
    /// Build a table from keys, collapsing duplicates.
    pub fn from_keys(keys: impl IntoIterator<Item = StatementKey>) -> Self {
        let mut table = Self::default();
        for key in keys {
            table.insert(key);
        }
        table
    }

    /// Insert a key. Returns `false` if it was already present.
    pub fn insert(&mut self, key: StatementKey) -> bool {
        if !self.members.insert(key) {
            return false;
        }
        let row = self.rows.len() as u32;
        self.rows.push(key);
        self.by_subject.entry(key.subject).or_default().push(row);
        self.by_predicate.entry(key.predicate).or_default().push(row);
        true
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &StatementKey) -> bool {
        self.members.contains(key)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[StatementKey] {
        &self.rows
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cursor(&self, filter: &ScanFilter) -> Cursor<'_> {
        // The subject index is the more selective one when both are given.
        let index = match (filter.subject, filter.predicate) {
            (Some(s), _) => Some(self.by_subject.get(&s)),
            (None, Some(p)) => Some(self.by_predicate.get(&p)),
            (None, None) => None,
        };
        match index {
            Some(Some(rows)) => Cursor::Indexed(rows.iter()),
            Some(None) => Cursor::Indexed([].iter()),
            None => Cursor::All(self.rows.iter()),
        }
    }
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

/// Optional column filters for [`StoreState::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub stanza: Option<TermId>,
    pub subject: Option<TermId>,
    pub predicate: Option<TermId>,
}

impl ScanFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one predicate.
    pub fn predicate(mut self, predicate: TermId) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Restrict to one subject.
    pub fn subject(mut self, subject: TermId) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Restrict to one stanza.
    pub fn stanza(mut self, stanza: TermId) -> Self {
        self.stanza = Some(stanza);
        self
    }

    fn matches(&self, key: &StatementKey) -> bool {
        self.subject.is_none_or(|s| key.subject == s)
            && self.predicate.is_none_or(|p| key.predicate == p)
    }
}

#[derive(Debug, Clone)]
enum Cursor<'a> {
    All(std::slice::Iter<'a, StatementKey>),
    Indexed(std::slice::Iter<'a, u32>),
}

/// Lazy scan over a snapshot.
///
/// Cloning a scan gives an independent cursor at the same position; calling
/// [`StoreState::scan`] again restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    tables: std::collections::btree_map::Range<'a, TermId, Arc<StanzaTable>>,
    current: Option<(&'a StanzaTable, Cursor<'a>)>,
    filter: ScanFilter,
}

impl<'a> Iterator for Scan<'a> {
    type Item = &'a StatementKey;

    fn next(&mut self) -> Option<Self::Item> {
        let Self {
            tables,
            current,
            filter,
        } = self;
        loop {
            if let Some((table, cursor)) = current {
                let table: &'a StanzaTable = *table;
                let found = match cursor {
                    Cursor::All(it) => it.find(|key| filter.matches(key)),
                    Cursor::Indexed(it) => it
                        .map(|&row| &table.rows[row as usize])
                        .find(|key| filter.matches(key)),
                };
                if found.is_some() {
                    return found;
                }
            }
            let (_, table) = tables.next()?;
            let table: &'a StanzaTable = table;
            *current = Some((table, table.cursor(filter)));
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// An immutable view of every stanza at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    stanzas: BTreeMap<TermId, Arc<StanzaTable>>,
    generation: u64,
}

impl StoreState {
    /// Scan statements matching the filter.
    pub fn scan(&self, filter: ScanFilter) -> Scan<'_> {
        let tables = match filter.stanza {
            Some(stanza) => self.stanzas.range(stanza..=stanza),
            None => self.stanzas.range(..),
        };
        Scan {
            tables,
            current: None,
            filter,
        }
    }

    /// The table for one stanza.
    pub fn stanza(&self, stanza: TermId) -> Option<&StanzaTable> {
        self.stanzas.get(&stanza).map(|t| t.as_ref())
    }

    /// Ids of all stanzas holding statements.
    pub fn stanza_ids(&self) -> Vec<TermId> {
        self.stanzas.keys().copied().collect()
    }

    /// Every distinct subject, in id order.
    pub fn subjects(&self) -> BTreeSet<TermId> {
        self.stanzas
            .values()
            .flat_map(|t| t.by_subject.keys().copied())
            .collect()
    }

    /// Whether the exact statement is present.
    pub fn contains(&self, key: &StatementKey) -> bool {
        self.stanzas
            .get(&key.stanza)
            .is_some_and(|t| t.contains(key))
    }

    /// Total number of statements across all stanzas.
    pub fn len(&self) -> usize {
        self.stanzas.values().map(|t| t.len()).sum()
    }

    /// Whether no statements are stored.
    pub fn is_empty(&self) -> bool {
        self.stanzas.is_empty()
    }

    /// Monotonic counter bumped by every committed write.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// The store
// ---------------------------------------------------------------------------

/// Counts reported by [`StatementStore::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Statements the stanza held before.
    pub previous: usize,
    /// Statements the stanza holds now.
    pub current: usize,
}

/// Counts reported by [`StatementStore::extend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Single-writer, multi-reader statement store.
#[derive(Debug, Default)]
pub struct StatementStore {
    state: RwLock<Arc<StoreState>>,
    writer: Mutex<()>,
}

impl StatementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a consistent snapshot for reading.
    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Insert one statement. Returns whether it was newly added.
    pub fn insert(&self, key: StatementKey) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.snapshot().contains(&key) {
            return false;
        }
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = Arc::make_mut(&mut *guard);
        let table = Arc::make_mut(state.stanzas.entry(key.stanza).or_default());
        let inserted = table.insert(key);
        state.generation += 1;
        inserted
    }

    /// Add a batch of statements, possibly across stanzas, as one write.
    ///
    /// `before_swap` sees every stanza the batch changes, as it will look
    /// afterwards, and runs before any of it becomes visible; if it fails,
    /// nothing changes. It is not called when every key is already present.
    pub fn extend<F, E>(
        &self,
        keys: impl IntoIterator<Item = StatementKey>,
        before_swap: F,
    ) -> Result<ExtendOutcome, E>
    where
        F: FnOnce(&BTreeMap<TermId, StanzaTable>) -> Result<(), E>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let mut touched: BTreeMap<TermId, StanzaTable> = BTreeMap::new();
        let mut outcome = ExtendOutcome::default();
        for key in keys {
            if current.contains(&key) {
                outcome.duplicates += 1;
                continue;
            }
            let table = touched.entry(key.stanza).or_insert_with(|| {
                current
                    .stanza(key.stanza)
                    .cloned()
                    .unwrap_or_default()
            });
            if table.insert(key) {
                outcome.inserted += 1;
            } else {
                outcome.duplicates += 1;
            }
        }
        if touched.is_empty() {
            return Ok(outcome);
        }
        before_swap(&touched)?;

        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = Arc::make_mut(&mut *guard);
        for (stanza, table) in touched {
            state.stanzas.insert(stanza, Arc::new(table));
        }
        state.generation += 1;
        Ok(outcome)
    }

    /// Atomically swap every statement of `stanza` for `keys`.
    ///
    /// `before_swap` runs after the new table is built and before it becomes
    /// visible; if it fails, nothing changes. Readers see either the complete
    /// previous stanza or the complete new one.
    pub fn replace_all<F>(
        &self,
        stanza: TermId,
        keys: impl IntoIterator<Item = StatementKey>,
        before_swap: F,
    ) -> StoreResult<ReplaceOutcome>
    where
        F: FnOnce(&StanzaTable) -> StoreResult<()>,
    {
        let table = StanzaTable::from_keys(keys);
        if let Some(stray) = table.rows().iter().find(|k| k.stanza != stanza) {
            return Err(StoreError::PartialReplaceFailure {
                stanza: stanza.to_string(),
                message: format!("row for stanza {} in batch", stray.stanza),
            });
        }

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        before_swap(&table)?;

        let current = table.len();
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = Arc::make_mut(&mut *guard);
        let replaced = if table.is_empty() {
            state.stanzas.remove(&stanza)
        } else {
            state.stanzas.insert(stanza, Arc::new(table))
        };
        let previous = replaced.map_or(0, |t| t.len());
        state.generation += 1;
        Ok(ReplaceOutcome { previous, current })
    }

    /// Total number of statements.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
