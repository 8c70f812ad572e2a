//! Engine facade: top-level API for ontorel.
//!
//! The `Engine` owns the interner, the statement store, the optional redb
//! tier and the relation catalog. Writes go through it; every derived view is
//! computed from a [`Snapshot`] it hands out.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::axiom::{self, AxiomSet};
use crate::classify::{self, Classification, Classifier, Partition};
use crate::error::{ConfigError, EngineError, OntoResult, StoreError};
use crate::finding::FindingReport;
use crate::interner::TermInterner;
use crate::lists::{self, ListMaterialization};
use crate::prefix::{Prefix, PrefixMap};
use crate::schema::{RelationRows, SchemaDescriptor};
use crate::statement::{Statement, StatementKey};
use crate::store::durable::DurableStore;
use crate::store::{ReplaceOutcome, StanzaTable, StatementStore};
use crate::summary::{self, StatisticKind};
use crate::term::{TermId, TermKind};
use crate::view::{Snapshot, lexical_statement};
use crate::vocab::Vocabulary;

/// Configuration for the ontorel engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Data directory for persistence. `None` for memory-only mode.
    pub data_dir: Option<PathBuf>,
    /// Prefix declarations on top of rdf, rdfs, owl and xsd.
    pub prefixes: Vec<Prefix>,
    /// Node count from which whole-store classification runs on rayon.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            prefixes: Vec::new(),
            parallel_threshold: classify::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Counts reported by [`Engine::ingest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub duplicates: usize,
}

/// The ontorel ingestion and view engine.
pub struct Engine {
    config: EngineConfig,
    interner: Arc<TermInterner>,
    vocab: Arc<Vocabulary>,
    prefixes: RwLock<Arc<PrefixMap>>,
    store: StatementStore,
    durable: Option<DurableStore>,
    schema: SchemaDescriptor,
}

impl Engine {
    /// Create a new engine, restoring persisted stanzas when `data_dir` is set.
    pub fn new(config: EngineConfig) -> OntoResult<Self> {
        let mut prefixes = PrefixMap::standard();
        for p in &config.prefixes {
            if p.prefix.is_empty() || p.base.is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "prefix declarations need a name and a base (got '{}' -> '{}')",
                        p.prefix, p.base
                    ),
                }
                .into());
            }
            prefixes.declare(p.prefix.clone(), p.base.clone());
        }

        tracing::info!(
            persistent = config.data_dir.is_some(),
            prefixes = prefixes.entries().len(),
            "initializing ontorel engine"
        );

        let interner = Arc::new(TermInterner::new());
        let vocab = Arc::new(Vocabulary::resolve(&interner)?);

        let durable = match config.data_dir {
            Some(ref dir) => {
                std::fs::create_dir_all(dir).map_err(|_| EngineError::DataDir {
                    path: dir.display().to_string(),
                })?;
                let durable = DurableStore::open(dir)?;
                for p in durable.load_prefixes()? {
                    prefixes.declare(p.prefix, p.base);
                }
                durable.put_prefixes(prefixes.entries())?;
                Some(durable)
            }
            None => None,
        };

        let engine = Self {
            config,
            interner,
            vocab,
            prefixes: RwLock::new(Arc::new(prefixes)),
            store: StatementStore::new(),
            durable,
            schema: SchemaDescriptor::standard(),
        };
        engine.restore()?;
        Ok(engine)
    }

    /// Load every persisted stanza into memory.
    fn restore(&self) -> OntoResult<()> {
        let Some(durable) = &self.durable else {
            return Ok(());
        };
        let stanzas = durable.load_stanzas()?;
        let mut restored = 0usize;
        for (stanza, statements) in stanzas {
            let stanza_id = self.interner.intern(&stanza, TermKind::Iri)?;
            let keys = statements
                .iter()
                .map(|s| self.intern_statement(s))
                .collect::<OntoResult<Vec<_>>>()?;
            let outcome = self.store.replace_all(stanza_id, keys, |_| Ok(()))?;
            restored += outcome.current;
        }
        tracing::info!(statements = restored, "restored persisted stanzas");
        Ok(())
    }

    fn prefix_map(&self) -> Arc<PrefixMap> {
        Arc::clone(&self.prefixes.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Declare (or rebind) a CURIE prefix used for later ingestion.
    pub fn declare_prefix(&self, prefix: &str, base: &str) -> OntoResult<()> {
        let mut guard = self.prefixes.write().unwrap_or_else(PoisonError::into_inner);
        let mut map = PrefixMap::clone(&guard);
        map.declare(prefix, base);
        if let Some(durable) = &self.durable {
            durable.put_prefixes(map.entries())?;
        }
        *guard = Arc::new(map);
        Ok(())
    }

    /// Validate a statement and bring it into stored (CURIE) form.
    pub fn canonicalize(&self, statement: &Statement) -> OntoResult<Statement> {
        statement.validate()?;
        let prefixes = self.prefix_map();
        let node = |lexical: &str| match TermKind::of_node(lexical) {
            TermKind::Blank => lexical.to_string(),
            _ => prefixes.contract(lexical),
        };
        Ok(Statement {
            stanza: statement.stanza.clone(),
            subject: node(&statement.subject),
            predicate: prefixes.contract(&statement.predicate),
            object: statement.object.as_deref().map(node),
            value: statement.value.clone(),
            datatype: statement.datatype.as_deref().map(|d| prefixes.contract(d)),
            language: statement.language.clone(),
        })
    }

    /// Intern an already canonical statement.
    fn intern_statement(&self, s: &Statement) -> OntoResult<StatementKey> {
        let i = &self.interner;
        Ok(StatementKey {
            stanza: i.intern(&s.stanza, TermKind::Iri)?,
            subject: i.intern_node(&s.subject)?,
            predicate: i.intern(&s.predicate, TermKind::Iri)?,
            object: s.object.as_deref().map(|o| i.intern_node(o)).transpose()?,
            value: s
                .value
                .as_deref()
                .map(|v| i.intern(v, TermKind::Literal))
                .transpose()?,
            datatype: s
                .datatype
                .as_deref()
                .map(|d| i.intern(d, TermKind::Iri))
                .transpose()?,
            language: s
                .language
                .as_deref()
                .map(|l| i.intern(l, TermKind::Literal))
                .transpose()?,
        })
    }

    /// Intern a term.
    pub fn intern(&self, lexical: &str, kind: TermKind) -> OntoResult<TermId> {
        self.interner.intern(lexical, kind)
    }

    /// Resolve a term id to its lexical form.
    pub fn resolve(&self, id: TermId) -> OntoResult<String> {
        self.interner.resolve(id)
    }

    /// Insert one statement. Returns whether it was newly added.
    ///
    /// With a data directory, the statement's whole stanza is rewritten on
    /// disk before the statement becomes visible. Loading statements one at a
    /// time therefore rewrites the stanza each time; use [`Engine::ingest`]
    /// for batches.
    pub fn insert(&self, statement: &Statement) -> OntoResult<bool> {
        let key = self.intern_statement(&self.canonicalize(statement)?)?;
        let outcome = self
            .store
            .extend([key], |tables| self.persist_tables(tables))?;
        Ok(outcome.inserted == 1)
    }

    /// Insert a batch of statements as one write.
    ///
    /// Every statement is validated first, and one invalid statement rejects
    /// the whole batch. The touched stanzas go to disk in a single
    /// transaction before any of the batch becomes visible.
    pub fn ingest(
        &self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> OntoResult<IngestReport> {
        let keys = statements
            .into_iter()
            .map(|s| self.intern_statement(&self.canonicalize(&s)?))
            .collect::<OntoResult<Vec<_>>>()?;
        let outcome = self
            .store
            .extend(keys, |tables| self.persist_tables(tables))?;
        tracing::info!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "ingested statements"
        );
        Ok(IngestReport {
            inserted: outcome.inserted,
            duplicates: outcome.duplicates,
        })
    }

    /// Write the given stanza tables to the durable tier.
    fn persist_tables(&self, tables: &BTreeMap<TermId, StanzaTable>) -> OntoResult<()> {
        let Some(durable) = &self.durable else {
            return Ok(());
        };
        let mut stanzas = Vec::with_capacity(tables.len());
        for (stanza, table) in tables {
            let rows = table
                .rows()
                .iter()
                .map(|key| lexical_statement(&self.interner, key))
                .collect::<OntoResult<Vec<_>>>()?;
            stanzas.push((self.resolve(*stanza)?, rows));
        }
        durable.put_stanzas(stanzas.iter().map(|(s, rows)| (s.as_str(), rows.as_slice())))?;
        Ok(())
    }

    /// Atomically replace every statement of `stanza`.
    ///
    /// Any invalid statement, foreign stanza or storage failure rejects the
    /// whole batch with [`StoreError::PartialReplaceFailure`]; the stanza then
    /// keeps its previous statements in memory and on disk.
    pub fn replace_all(
        &self,
        stanza: &str,
        statements: impl IntoIterator<Item = Statement>,
    ) -> OntoResult<ReplaceOutcome> {
        let failure = |message: String| StoreError::PartialReplaceFailure {
            stanza: stanza.to_string(),
            message,
        };

        let mut canonical = Vec::new();
        for statement in statements {
            if statement.stanza != stanza {
                let mismatch = StoreError::StanzaMismatch {
                    expected: stanza.to_string(),
                    found: statement.stanza.clone(),
                };
                return Err(failure(mismatch.to_string()).into());
            }
            canonical.push(
                self.canonicalize(&statement)
                    .map_err(|e| failure(e.to_string()))?,
            );
        }
        let keys = canonical
            .iter()
            .map(|s| self.intern_statement(s))
            .collect::<OntoResult<Vec<_>>>()?;
        let stanza_id = self.interner.intern(stanza, TermKind::Iri)?;

        let outcome = self.store.replace_all(stanza_id, keys, |_| match &self.durable {
            Some(durable) => durable
                .put_stanza(stanza, &canonical)
                .map_err(|e| failure(e.to_string())),
            None => Ok(()),
        })?;
        tracing::info!(
            stanza,
            previous = outcome.previous,
            current = outcome.current,
            "replaced stanza"
        );
        Ok(outcome)
    }

    /// A consistent read view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.store.snapshot(),
            Arc::clone(&self.interner),
            Arc::clone(&self.vocab),
            self.prefix_map(),
        )
    }

    fn node(&self, snapshot: &Snapshot, lexical: &str) -> OntoResult<TermId> {
        snapshot.node_id(lexical).ok_or_else(|| {
            EngineError::UnknownNode {
                lexical: lexical.to_string(),
            }
            .into()
        })
    }

    /// Classify one node, given in IRI or CURIE form.
    pub fn classify(&self, node: &str) -> OntoResult<Classification> {
        let snapshot = self.snapshot();
        let id = self.node(&snapshot, node)?;
        Classifier::new(&snapshot).classify(id)
    }

    /// Classify every node.
    pub fn classify_all(&self) -> OntoResult<(Snapshot, Partition)> {
        let snapshot = self.snapshot();
        let partition = Classifier::new(&snapshot)
            .with_parallel_threshold(self.config.parallel_threshold)
            .classify_all()?;
        Ok((snapshot, partition))
    }

    /// Reconstruct every RDF list.
    pub fn materialize_lists(&self) -> OntoResult<ListMaterialization> {
        lists::materialize_lists(&self.snapshot())
    }

    /// Compute one summary statistic.
    pub fn compute(&self, kind: StatisticKind) -> OntoResult<BTreeMap<String, u64>> {
        summary::compute(&self.snapshot(), kind)
    }

    /// Extract OWL axioms.
    pub fn axioms(&self) -> OntoResult<AxiomSet> {
        axiom::extract_axioms(&self.snapshot())
    }

    /// Materialize a named relation.
    pub fn relation(&self, name: &str) -> OntoResult<RelationRows> {
        self.schema
            .materialize(&self.snapshot(), name, self.config.parallel_threshold)
    }

    /// Every finding of every derived view, in a stable order.
    pub fn check(&self) -> OntoResult<FindingReport> {
        let snapshot = self.snapshot();
        let mut report = Classifier::new(&snapshot)
            .with_parallel_threshold(self.config.parallel_threshold)
            .classify_all()?
            .into_findings();
        report.merge(lists::materialize_lists(&snapshot)?.findings);
        report.merge(axiom::extract_axioms(&snapshot)?.findings);
        report.sort();
        Ok(report)
    }

    /// The relation catalog.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get system info (stanza, statement, node and term counts).
    pub fn info(&self) -> EngineInfo {
        let state = self.store.snapshot();
        EngineInfo {
            stanza_count: state.stanza_ids().len(),
            statement_count: state.len(),
            node_count: state.subjects().len(),
            term_count: self.interner.len(),
            prefix_count: self.prefix_map().entries().len(),
            generation: state.generation(),
            persistent: self.durable.is_some(),
        }
    }
}

/// Summary information about the engine state.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub stanza_count: usize,
    pub statement_count: usize,
    pub node_count: usize,
    pub term_count: usize,
    pub prefix_count: usize,
    pub generation: u64,
    pub persistent: bool,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ontorel engine info")?;
        writeln!(f, "  stanzas:      {}", self.stanza_count)?;
        writeln!(f, "  statements:   {}", self.statement_count)?;
        writeln!(f, "  nodes:        {}", self.node_count)?;
        writeln!(f, "  terms:        {}", self.term_count)?;
        writeln!(f, "  prefixes:     {}", self.prefix_count)?;
        writeln!(f, "  generation:   {}", self.generation)?;
        writeln!(f, "  persistent:   {}", self.persistent)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("durable", &self.durable)
            .finish()
    }
}
