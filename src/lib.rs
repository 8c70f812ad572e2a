// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ontorel
//!
//! Triple-store ingestion and typed-view materialization for RDF/OWL
//! ontologies.
//!
//! ## Architecture
//!
//! - **Terms** (`term`, `interner`, `prefix`): interned IRIs, blank nodes and
//!   literals with CURIE contraction
//! - **Statements** (`statement`, `store`): per-stanza statement tables with
//!   atomic stanza replacement and an optional redb tier
//! - **Classification** (`classify`): every node gets exactly one most-specific
//!   category; statements are routed into predicate projections
//! - **Derived views** (`lists`, `axiom`, `summary`): RDF lists, reified OWL
//!   axioms and per-predicate/class counts
//! - **Relations** (`schema`): the named catalog every view is exposed through
//!
//! ## Library usage
//!
//! ```no_run
//! use ontorel::engine::{Engine, EngineConfig};
//! use ontorel::statement::Statement;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! engine
//!     .insert(&Statement::node("anat", "ex:Finger", "rdf:type", "owl:Class"))
//!     .unwrap();
//! let classification = engine.classify("ex:Finger").unwrap();
//! println!("{}", classification.category);
//! ```

pub mod axiom;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod finding;
pub mod ingest;
pub mod interner;
pub mod lists;
pub mod prefix;
pub mod schema;
pub mod statement;
pub mod store;
pub mod summary;
pub mod term;
pub mod view;
pub mod vocab;
