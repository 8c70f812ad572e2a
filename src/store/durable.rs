//! ACID-durable stanza store backed by redb.
//!
//! Each stanza is one row: the stanza lexical form maps to the bincode-encoded
//! list of its statements. A stanza replace is therefore a single key write in
//! a single transaction, which is what makes reloads all-or-nothing on disk.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::StoreError;
use crate::prefix::Prefix;
use crate::statement::Statement;
use crate::store::StoreResult;

/// Stanza lexical form → bincode `Vec<Statement>`.
const STATEMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("statements");

/// CURIE prefix → base IRI.
const PREFIX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("prefixes");

fn redb_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Redb {
        message: format!("{context} failed: {e}"),
    }
}

/// ACID-durable store using redb.
///
/// All writes go through transactions. Reads use MVCC snapshots.
pub struct DurableStore {
    db: Arc<Database>,
}

impl DurableStore {
    /// Open or create a durable store in the given directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join("ontorel.redb");
        let db = Database::create(&db_path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Write (or, with no statements, delete) one stanza in one transaction.
    pub fn put_stanza(&self, stanza: &str, statements: &[Statement]) -> StoreResult<()> {
        self.put_stanzas([(stanza, statements)])
    }

    /// Write several stanzas in one transaction: all of them or none.
    pub fn put_stanzas<'a>(
        &self,
        stanzas: impl IntoIterator<Item = (&'a str, &'a [Statement])>,
    ) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        {
            let mut table = txn
                .open_table(STATEMENTS_TABLE)
                .map_err(|e| redb_err("open_table", e))?;
            for (stanza, statements) in stanzas {
                if statements.is_empty() {
                    table.remove(stanza).map_err(|e| redb_err("remove", e))?;
                    continue;
                }
                let encoded =
                    bincode::serialize(statements).map_err(|e| StoreError::Serialization {
                        message: format!("failed to serialize stanza {stanza}: {e}"),
                    })?;
                table
                    .insert(stanza, encoded.as_slice())
                    .map_err(|e| redb_err("insert", e))?;
            }
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(())
    }

    /// Read every persisted stanza.
    pub fn load_stanzas(&self) -> StoreResult<Vec<(String, Vec<Statement>)>> {
        let txn = self.db.begin_read().map_err(|e| redb_err("begin_read", e))?;
        let table = match txn.open_table(STATEMENTS_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(redb_err("open_table", e)),
        };
        let mut stanzas = Vec::new();
        for entry in table.iter().map_err(|e| redb_err("iter", e))? {
            let (key, value) = entry.map_err(|e| redb_err("read", e))?;
            let statements: Vec<Statement> =
                bincode::deserialize(value.value()).map_err(|e| StoreError::Serialization {
                    message: format!("failed to deserialize stanza {}: {e}", key.value()),
                })?;
            stanzas.push((key.value().to_owned(), statements));
        }
        Ok(stanzas)
    }

    /// Replace the persisted prefix declarations.
    pub fn put_prefixes(&self, prefixes: &[Prefix]) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        {
            let mut table = txn
                .open_table(PREFIX_TABLE)
                .map_err(|e| redb_err("open_table", e))?;
            for p in prefixes {
                table
                    .insert(p.prefix.as_str(), p.base.as_str())
                    .map_err(|e| redb_err("insert", e))?;
            }
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(())
    }

    /// Read the persisted prefix declarations.
    pub fn load_prefixes(&self) -> StoreResult<Vec<Prefix>> {
        let txn = self.db.begin_read().map_err(|e| redb_err("begin_read", e))?;
        let table = match txn.open_table(PREFIX_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(redb_err("open_table", e)),
        };
        let mut prefixes = Vec::new();
        for entry in table.iter().map_err(|e| redb_err("iter", e))? {
            let (prefix, base) = entry.map_err(|e| redb_err("read", e))?;
            prefixes.push(Prefix {
                prefix: prefix.value().to_owned(),
                base: base.value().to_owned(),
            });
        }
        Ok(prefixes)
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_and_load_stanza() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        let rows = vec![
            Statement::node("go", "ex:A", "rdf:type", "owl:Class"),
            Statement::literal("go", "ex:A", "rdfs:label", "a").with_language("en"),
        ];
        store.put_stanza("go", &rows).unwrap();

        let loaded = store.load_stanzas().unwrap();
        assert_eq!(loaded, vec![("go".to_string(), rows)]);
    }

    #[test]
    fn empty_stanza_deletes_row() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        store
            .put_stanza("go", &[Statement::node("go", "ex:A", "ex:p", "ex:B")])
            .unwrap();
        store.put_stanza("go", &[]).unwrap();
        assert!(store.load_stanzas().unwrap().is_empty());
    }

    #[test]
    fn several_stanzas_in_one_transaction() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        store
            .put_stanza("old", &[Statement::node("old", "ex:A", "ex:p", "ex:B")])
            .unwrap();
        let go = vec![Statement::node("go", "ex:G", "rdf:type", "owl:Class")];
        let uberon = vec![Statement::node("uberon", "ex:U", "rdf:type", "owl:Class")];
        store
            .put_stanzas([
                ("go", go.as_slice()),
                ("uberon", uberon.as_slice()),
                ("old", &[][..]),
            ])
            .unwrap();

        let names: Vec<String> = store
            .load_stanzas()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["go", "uberon"]);
    }

    #[test]
    fn fresh_database_has_no_tables() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        assert!(store.load_stanzas().unwrap().is_empty());
        assert!(store.load_prefixes().unwrap().is_empty());
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        {
            let store = DurableStore::open(dir.path()).unwrap();
            store
                .put_stanza("uberon", &[Statement::node("uberon", "ex:A", "ex:p", "ex:B")])
                .unwrap();
            store
                .put_prefixes(&[Prefix {
                    prefix: "ex".into(),
                    base: "http://example.org/".into(),
                }])
                .unwrap();
        }
        let store = DurableStore::open(dir.path()).unwrap();
        assert_eq!(store.load_stanzas().unwrap().len(), 1);
        assert_eq!(store.load_prefixes().unwrap()[0].prefix, "ex");
    }
}
