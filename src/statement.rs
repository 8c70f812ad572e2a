//! The seven-column statement model.
//!
//! [`Statement`] is the lexical form callers ingest and read back.
//! [`StatementKey`] is the interned form the store keeps; it is `Copy` and
//! hashes all seven columns, which is what gives the store set semantics.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::term::TermId;

/// A statement `(stanza, subject, predicate, object, value, datatype, language)`.
///
/// Exactly one of `object` (node-to-node) or `value` (node-to-value) is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub stanza: String,
    pub subject: String,
    pub predicate: String,
    pub object: Option<String>,
    pub value: Option<String>,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Statement {
    /// A node-to-node statement.
    pub fn node(
        stanza: impl Into<String>,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            stanza: stanza.into(),
            subject: subject.into(),
            predicate: predicate.into(),
            object: Some(object.into()),
            value: None,
            datatype: None,
            language: None,
        }
    }

    /// A node-to-value statement with a plain literal.
    pub fn literal(
        stanza: impl Into<String>,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            stanza: stanza.into(),
            subject: subject.into(),
            predicate: predicate.into(),
            object: None,
            value: Some(value.into()),
            datatype: None,
            language: None,
        }
    }

    /// Set the literal datatype.
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Set the literal language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Whether this is a node-to-node statement.
    pub fn is_node_to_node(&self) -> bool {
        self.object.is_some()
    }

    /// The object or value, whichever is populated.
    pub fn target(&self) -> Option<&str> {
        self.object.as_deref().or(self.value.as_deref())
    }

    /// Check the object/value exclusivity invariant.
    pub fn validate(&self) -> Result<(), StoreError> {
        let reason = match (&self.object, &self.value) {
            (Some(_), Some(_)) => Some("both object and value are set"),
            (None, None) => Some("neither object nor value is set"),
            (Some(_), None) if self.datatype.is_some() || self.language.is_some() => {
                Some("datatype/language set on a node-to-node statement")
            }
            _ if self.subject.is_empty() || self.predicate.is_empty() => {
                Some("subject and predicate must be non-empty")
            }
            _ => None,
        };
        match reason {
            Some(reason) => Err(StoreError::InvalidStatement {
                subject: self.subject.clone(),
                predicate: self.predicate.clone(),
                reason: reason.into(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} {} ", self.stanza, self.subject, self.predicate)?;
        match (&self.object, &self.value) {
            (Some(o), _) => write!(f, "{o}"),
            (None, Some(v)) => {
                write!(f, "{v:?}")?;
                if let Some(lang) = &self.language {
                    write!(f, "@{lang}")?;
                }
                if let Some(dt) = &self.datatype {
                    write!(f, "^^{dt}")?;
                }
                Ok(())
            }
            (None, None) => write!(f, "?"),
        }
    }
}

/// Interned statement; the unit of storage and set identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementKey {
    pub stanza: TermId,
    pub subject: TermId,
    pub predicate: TermId,
    pub object: Option<TermId>,
    pub value: Option<TermId>,
    pub datatype: Option<TermId>,
    pub language: Option<TermId>,
}

impl StatementKey {
    /// The object or value id, whichever is populated.
    pub fn target(&self) -> Option<TermId> {
        self.object.or(self.value)
    }
}
