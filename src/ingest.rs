//! Ingestion adapters: turn serialized RDF into [`Statement`]s for one stanza.
//!
//! These sit outside the core. The engine only ever sees statements; the
//! graph name of quad formats is ignored in favour of the stanza argument.
//! Blank node labels are document-scoped, so they are prefixed with the
//! stanza to keep two documents' `_:b` apart.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;
use oxigraph::model::vocab::{rdf, xsd};
use serde::Deserialize;

use crate::error::IngestError;
use crate::statement::Statement;

pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Input formats accepted by [`read_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Turtle,
    NTriples,
    NQuads,
    RdfXml,
    /// One JSON statement object per line.
    JsonLines,
}

impl InputFormat {
    /// Guess from a file extension.
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        match path.extension()?.to_str()? {
            "ttl" => Some(InputFormat::Turtle),
            "nt" => Some(InputFormat::NTriples),
            "nq" => Some(InputFormat::NQuads),
            "owl" | "rdf" | "xml" => Some(InputFormat::RdfXml),
            "jsonl" | "ndjson" => Some(InputFormat::JsonLines),
            _ => None,
        }
    }

    fn rdf_format(self) -> Option<RdfFormat> {
        match self {
            InputFormat::Turtle => Some(RdfFormat::Turtle),
            InputFormat::NTriples => Some(RdfFormat::NTriples),
            InputFormat::NQuads => Some(RdfFormat::NQuads),
            InputFormat::RdfXml => Some(RdfFormat::RdfXml),
            InputFormat::JsonLines => None,
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(InputFormat::Turtle),
            "ntriples" | "nt" => Ok(InputFormat::NTriples),
            "nquads" | "nq" => Ok(InputFormat::NQuads),
            "rdfxml" | "rdf/xml" | "owl" => Ok(InputFormat::RdfXml),
            "jsonl" | "json-lines" => Ok(InputFormat::JsonLines),
            other => Err(IngestError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Read a file in the given format.
pub fn read_file(path: &Path, format: InputFormat, stanza: &str) -> IngestResult<Vec<Statement>> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let statements = match format.rdf_format() {
        Some(rdf_format) => read_rdf(reader, rdf_format, stanza)?,
        None => read_json_lines(reader, stanza)?,
    };
    tracing::info!(
        path = %path.display(),
        stanza,
        statements = statements.len(),
        "read input"
    );
    Ok(statements)
}

/// Parse an RDF serialization with oxigraph.
pub fn read_rdf(reader: impl Read, format: RdfFormat, stanza: &str) -> IngestResult<Vec<Statement>> {
    let mut statements = Vec::new();
    for quad in RdfParser::from_format(format).for_reader(reader) {
        let quad = quad.map_err(|e| IngestError::Parse {
            message: e.to_string(),
        })?;
        let subject = match node_lexical(Term::from(quad.subject), stanza) {
            Some(s) => s,
            None => {
                return Err(IngestError::Parse {
                    message: "unsupported subject term".into(),
                });
            }
        };
        let predicate = quad.predicate.into_string();
        let statement = match quad.object {
            Term::Literal(literal) => {
                let s = Statement::literal(stanza, subject, predicate, literal.value());
                let datatype = literal.datatype();
                match literal.language() {
                    Some(language) => s.with_language(language),
                    None if datatype != xsd::STRING && datatype != rdf::LANG_STRING => {
                        s.with_datatype(datatype.as_str())
                    }
                    None => s,
                }
            }
            other => match node_lexical(other, stanza) {
                Some(object) => Statement::node(stanza, subject, predicate, object),
                None => {
                    return Err(IngestError::Parse {
                        message: "unsupported object term".into(),
                    });
                }
            },
        };
        statements.push(statement);
    }
    Ok(statements)
}

/// Lexical form of an IRI or stanza-scoped blank node term.
#[allow(unreachable_patterns)]
fn node_lexical(term: Term, stanza: &str) -> Option<String> {
    match term {
        Term::NamedNode(node) => Some(node.into_string()),
        Term::BlankNode(node) => Some(format!("_:{stanza}-{}", node.as_str())),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct JsonStatement {
    #[serde(default)]
    stanza: Option<String>,
    subject: String,
    predicate: String,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Read one JSON statement per line. Blank lines are skipped; a missing
/// `stanza` field defaults to `stanza`.
pub fn read_json_lines(reader: impl BufRead, stanza: &str) -> IngestResult<Vec<Statement>> {
    let mut statements = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| IngestError::Json {
            line: line_no,
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: JsonStatement = serde_json::from_str(&line).map_err(|e| IngestError::Json {
            line: line_no,
            message: e.to_string(),
        })?;
        let statement = Statement {
            stanza: raw.stanza.unwrap_or_else(|| stanza.to_string()),
            subject: raw.subject,
            predicate: raw.predicate,
            object: raw.object,
            value: raw.value,
            datatype: raw.datatype,
            language: raw.language,
        };
        statement.validate().map_err(|e| IngestError::Json {
            line: line_no,
            message: e.to_string(),
        })?;
        statements.push(statement);
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turtle_restriction_with_label() {
        let ttl = r#"
            @prefix ex: <http://example.org/> .
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            ex:Finger rdfs:subClassOf _:r ;
                rdfs:label "finger"@en .
            _:r owl:onProperty ex:partOf ; owl:someValuesFrom ex:Hand .
        "#;
        let rows = read_rdf(ttl.as_bytes(), RdfFormat::Turtle, "anat").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|s| s.stanza == "anat" && s.validate().is_ok()));
        let label = rows
            .iter()
            .find(|s| s.predicate.ends_with("#label"))
            .unwrap();
        assert_eq!(label.value.as_deref(), Some("finger"));
        assert_eq!(label.language.as_deref(), Some("en"));
        assert!(label.datatype.is_none());
        assert!(rows
            .iter()
            .any(|s| s.subject.starts_with("_:") && s.object.as_deref() == Some("http://example.org/Hand")));
    }

    #[test]
    fn ntriples_typed_literal_keeps_datatype() {
        let nt = "<http://example.org/A> <http://www.w3.org/2002/07/owl#deprecated> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> .\n";
        let rows = read_rdf(nt.as_bytes(), RdfFormat::NTriples, "s").unwrap();
        assert_eq!(
            rows[0].datatype.as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#boolean")
        );
    }

    #[test]
    fn blank_labels_are_scoped_to_their_stanza() {
        let nt = "_:b <http://www.w3.org/2000/01/rdf-schema#label> \"x\" .\n";
        let anat = read_rdf(nt.as_bytes(), RdfFormat::NTriples, "anat").unwrap();
        let go = read_rdf(nt.as_bytes(), RdfFormat::NTriples, "go").unwrap();
        assert_eq!(anat[0].subject, "_:anat-b");
        assert_eq!(go[0].subject, "_:go-b");
    }

    #[test]
    fn malformed_turtle_is_parse_error() {
        let err = read_rdf("ex:A ex:b".as_bytes(), RdfFormat::Turtle, "s").unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
    }

    #[test]
    fn json_lines() {
        let input = concat!(
            r#"{"subject":"ex:A","predicate":"rdf:type","object":"owl:Class"}"#,
            "\n\n",
            r#"{"stanza":"other","subject":"ex:A","predicate":"rdfs:label","value":"a","language":"en"}"#,
            "\n"
        );
        let rows = read_json_lines(input.as_bytes(), "go").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stanza, "go");
        assert_eq!(rows[1].stanza, "other");
    }

    #[test]
    fn json_line_with_object_and_value_is_rejected() {
        let input = r#"{"subject":"ex:A","predicate":"ex:p","object":"ex:B","value":"x"}"#;
        let err = read_json_lines(input.as_bytes(), "go").unwrap_err();
        assert!(matches!(err, IngestError::Json { line: 1, .. }));
    }

    #[test]
    fn format_names() {
        assert_eq!("turtle".parse::<InputFormat>().unwrap(), InputFormat::Turtle);
        assert_eq!(
            InputFormat::from_path(Path::new("go.owl")),
            Some(InputFormat::RdfXml)
        );
        assert!("csv".parse::<InputFormat>().is_err());
    }
}
