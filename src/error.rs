//! Rich diagnostic error types for the ontorel engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. These are the fatal
//! errors; non-fatal classification and list findings live in [`crate::finding`].

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the ontorel engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum OntoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Term errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("unknown term id {id}: only ids 1..={issued} have been issued")]
    #[diagnostic(
        code(ontorel::term::unknown),
        help(
            "A term id was resolved that this interner never issued. Term ids are \
             only valid within the session that created them; do not carry them \
             across engine restarts."
        )
    )]
    UnknownTerm { id: u64, issued: u64 },

    #[error("term allocator exhausted: cannot allocate more than u64::MAX terms")]
    #[diagnostic(
        code(ontorel::term::exhausted),
        help("The term id space is exhausted. Check for an interning loop.")
    )]
    AllocatorExhausted,
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("invalid statement ({subject}, {predicate}): {reason}")]
    #[diagnostic(
        code(ontorel::store::invalid_statement),
        help(
            "A statement must populate exactly one of `object` (node-to-node) or \
             `value` (node-to-value). Datatype and language only apply to values."
        )
    )]
    InvalidStatement {
        subject: String,
        predicate: String,
        reason: String,
    },

    #[error("statement belongs to stanza {found}, expected {expected}")]
    #[diagnostic(
        code(ontorel::store::stanza_mismatch),
        help("Every statement passed to `replace_all` must carry the stanza being replaced.")
    )]
    StanzaMismatch { expected: String, found: String },

    #[error("replacing stanza {stanza} failed; previous statements kept: {message}")]
    #[diagnostic(
        code(ontorel::store::partial_replace),
        help(
            "The replacement was rejected as a whole. The stanza still holds its \
             previous statements and other stanzas are unaffected. Fix the cause \
             and reload the stanza."
        )
    )]
    PartialReplaceFailure { stanza: String, message: String },

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(ontorel::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(ontorel::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             This may indicate corruption; try running with a fresh data directory."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(ontorel::store::serde),
        help(
            "Failed to serialize or deserialize stored rows. The stored format may \
             have changed between versions; reload the affected stanzas."
        )
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("failed to read {path}")]
    #[diagnostic(
        code(ontorel::ingest::io),
        help("Ensure the input file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("RDF parse error: {message}")]
    #[diagnostic(
        code(ontorel::ingest::parse),
        help("The input is not valid for the selected format. Check `--format`.")
    )]
    Parse { message: String },

    #[error("invalid JSON statement on line {line}: {message}")]
    #[diagnostic(
        code(ontorel::ingest::json),
        help(
            "Each line must be a JSON object with `subject`, `predicate` and exactly \
             one of `object` or `value`; `datatype` and `language` are optional."
        )
    )]
    Json { line: usize, message: String },

    #[error("unsupported input format: {format}")]
    #[diagnostic(
        code(ontorel::ingest::format),
        help("Supported formats: turtle, ntriples, nquads, rdfxml, jsonl.")
    )]
    UnsupportedFormat { format: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ontorel::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(ontorel::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(ontorel::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("data directory error: {path}")]
    #[diagnostic(
        code(ontorel::engine::data_dir),
        help(
            "The data directory could not be accessed. \
             Ensure the path exists and has read/write permissions."
        )
    )]
    DataDir { path: String },

    #[error("unknown relation: {name}")]
    #[diagnostic(
        code(ontorel::engine::unknown_relation),
        help("List the available relations with `ontorel relation --list`.")
    )]
    UnknownRelation { name: String },

    #[error("unknown node: {lexical}")]
    #[diagnostic(
        code(ontorel::engine::unknown_node),
        help("The term has never been ingested. Check the spelling or the CURIE prefix.")
    )]
    UnknownNode { lexical: String },
}

/// Convenience alias for functions returning ontorel results.
pub type OntoResult<T> = std::result::Result<T, OntoError>;
