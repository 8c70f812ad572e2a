//! End-to-end integration tests for the ontorel engine.
//!
//! These exercise the full path from statement ingestion through
//! classification, list reconstruction, statistics and relation
//! materialization.

use ontorel::classify::{CategoryTag, NodeCategory, Restriction};
use ontorel::engine::{Engine, EngineConfig};
use ontorel::error::{OntoError, StoreError};
use ontorel::finding::{Finding, ListDefect};
use ontorel::statement::Statement;
use ontorel::summary::StatisticKind;

fn test_engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

fn node(stanza: &str, s: &str, p: &str, o: &str) -> Statement {
    Statement::node(stanza, s, p, o)
}

#[test]
fn class_declaration_is_class_node() {
    let engine = test_engine();
    engine
        .insert(&node("s1", "ex:A", "rdf:type", "owl:Class"))
        .unwrap();
    let c = engine.classify("ex:A").unwrap();
    assert_eq!(c.category, NodeCategory::ClassNode);
    assert!(c.findings.is_empty());
}

#[test]
fn some_values_from_restriction() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "_:b1", "owl:onProperty", "ex:partOf"),
            node("s1", "_:b1", "owl:someValuesFrom", "ex:Hand"),
        ])
        .unwrap();
    let c = engine.classify("_:b1").unwrap();
    assert_eq!(
        c.category,
        NodeCategory::SomeValuesFrom(Restriction::new("ex:partOf", Some("ex:Hand".to_string())))
    );
    assert_eq!(c.category.tag(), CategoryTag::SomeValuesFrom);

    let rows = engine.relation("owl_some_values_from").unwrap();
    assert_eq!(
        rows.rows,
        vec![vec![
            Some("_:b1".to_string()),
            Some("ex:partOf".to_string()),
            Some("ex:Hand".to_string()),
        ]]
    );
    // Restrictions are also members of every ancestor relation.
    let restrictions = engine.relation("owl_restriction").unwrap();
    assert_eq!(restrictions.rows.len(), 1);
}

#[test]
fn single_member_list() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "_:l1", "rdf:first", "ex:X"),
            node("s1", "_:l1", "rdf:rest", "rdf:nil"),
        ])
        .unwrap();
    let lists = engine.materialize_lists().unwrap();
    assert_eq!(lists.lists.len(), 1);
    assert_eq!(lists.members_of("_:l1"), Some(&["ex:X".to_string()][..]));
    assert!(lists.findings.is_empty());
}

#[test]
fn subclass_counts_sum_to_statement_count() {
    let engine = test_engine();
    let statements: Vec<Statement> = (0..100)
        .map(|i| {
            node(
                "s1",
                &format!("ex:C{}", i % 40),
                "rdfs:subClassOf",
                &format!("ex:Super{}", i / 40),
            )
        })
        .collect();
    let report = engine.ingest(statements).unwrap();
    assert_eq!(report.inserted, 100);

    let counts = engine.compute(StatisticKind::Subclasses).unwrap();
    assert_eq!(counts.values().sum::<u64>(), 100);
    assert_eq!(counts["ex:Super0"], 40);
    assert_eq!(counts["ex:Super1"], 40);
    assert_eq!(counts["ex:Super2"], 20);

    let predicates = engine.compute(StatisticKind::PredicateUsage).unwrap();
    assert_eq!(predicates["rdfs:subClassOf"], 100);
}

#[test]
fn repeated_insert_is_idempotent() {
    let engine = test_engine();
    let s = node("s1", "ex:A", "rdf:type", "owl:Class");
    assert!(engine.insert(&s).unwrap());
    let before = engine.info();
    assert!(!engine.insert(&s).unwrap());
    let after = engine.info();
    assert_eq!(before.statement_count, after.statement_count);
    assert_eq!(engine.relation("statements").unwrap().rows.len(), 1);
}

#[test]
fn statement_with_object_and_value_is_rejected() {
    let engine = test_engine();
    let mut bad = node("s1", "ex:A", "rdfs:label", "ex:B");
    bad.value = Some("a label".into());
    let err = engine.insert(&bad).unwrap_err();
    assert!(matches!(err, OntoError::Store(StoreError::InvalidStatement { .. })));
    assert_eq!(engine.info().statement_count, 0);

    let neither = Statement {
        object: None,
        ..node("s1", "ex:A", "rdfs:label", "ex:B")
    };
    assert!(engine.insert(&neither).is_err());
}

#[test]
fn every_node_gets_exactly_one_category() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "ex:A", "rdf:type", "owl:Class"),
            node("s1", "ex:A", "rdfs:subClassOf", "_:r"),
            node("s1", "_:r", "rdf:type", "owl:Restriction"),
            node("s1", "_:r", "owl:onProperty", "ex:partOf"),
            node("s1", "_:r", "owl:allValuesFrom", "ex:Hand"),
            node("s1", "ex:partOf", "rdf:type", "owl:ObjectProperty"),
            node("s1", "ex:partOf", "rdf:type", "owl:TransitiveProperty"),
            node("s1", "ex:x", "ex:unrelated", "ex:y"),
            Statement::literal("s1", "ex:A", "rdfs:label", "a"),
        ])
        .unwrap();

    let (snapshot, partition) = engine.classify_all().unwrap();
    assert_eq!(partition.len(), snapshot.nodes().len());
    for (id, category) in partition.iter() {
        assert!(category.is_a(CategoryTag::Node), "{id:?} escaped the hierarchy");
    }

    let category_of = |lexical: &str| {
        let id = snapshot.node_id(lexical).unwrap();
        partition.category(id).unwrap().tag()
    };
    assert_eq!(category_of("ex:A"), CategoryTag::ClassNode);
    assert_eq!(category_of("_:r"), CategoryTag::AllValuesFrom);
    assert_eq!(category_of("ex:partOf"), CategoryTag::TransitivePropertyNode);
    assert_eq!(category_of("ex:x"), CategoryTag::IriNode);

    // Transitive properties still show up under object properties.
    let object_properties = engine.relation("object_property_node").unwrap();
    assert!(object_properties
        .rows
        .iter()
        .any(|row| row[0].as_deref() == Some("ex:partOf")));
}

#[test]
fn rest_cycle_is_reported_not_fatal() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "_:a", "rdf:first", "ex:X"),
            node("s1", "_:a", "rdf:rest", "_:b"),
            node("s1", "_:b", "rdf:first", "ex:Y"),
            node("s1", "_:b", "rdf:rest", "_:a"),
            node("s1", "_:ok", "rdf:first", "ex:Z"),
            node("s1", "_:ok", "rdf:rest", "rdf:nil"),
        ])
        .unwrap();

    let lists = engine.materialize_lists().unwrap();
    assert_eq!(lists.lists.len(), 1);
    assert_eq!(lists.lists[0].head, "_:ok");
    assert!(lists.findings.findings().iter().any(|f| matches!(
        f,
        Finding::MalformedList {
            defect: ListDefect::Cycle,
            ..
        }
    )));

    let report = engine.check().unwrap();
    assert_eq!(report.malformed_lists(), 1);
}

#[test]
fn malformed_head_with_well_formed_tail() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "_:h", "rdf:first", "ex:A"),
            node("s1", "_:h", "rdf:first", "ex:B"),
            node("s1", "_:h", "rdf:rest", "_:t"),
            node("s1", "_:t", "rdf:first", "ex:C"),
            node("s1", "_:t", "rdf:rest", "rdf:nil"),
            node("s1", "_:nofirst", "rdf:rest", "_:t2"),
            node("s1", "_:t2", "rdf:first", "ex:D"),
            node("s1", "_:t2", "rdf:rest", "rdf:nil"),
        ])
        .unwrap();

    let lists = engine.materialize_lists().unwrap();
    assert!(lists.lists.is_empty());
    let defects: Vec<(&str, ListDefect)> = lists
        .findings
        .findings()
        .iter()
        .filter_map(|f| match f {
            Finding::MalformedList { head, defect, .. } => Some((head.as_str(), *defect)),
            _ => None,
        })
        .collect();
    assert_eq!(
        defects,
        [("_:h", ListDefect::Branching), ("_:nofirst", ListDefect::MissingFirst)]
    );

    // One finding per malformed list, none for the tails.
    let report = engine.check().unwrap();
    assert_eq!(report.malformed_lists(), 2);
    assert!(engine.relation("rdf_list_member_statement").unwrap().rows.is_empty());
}

#[test]
fn readers_see_whole_stanzas_during_replace() {
    let engine = test_engine();
    let batch = |tag: &str| -> Vec<Statement> {
        (0..50)
            .map(|i| node("onto", &format!("ex:{tag}{i}"), "rdf:type", "owl:Class"))
            .collect()
    };
    engine.replace_all("onto", batch("Old")).unwrap();

    std::thread::scope(|scope| {
        let reader = scope.spawn(|| {
            for _ in 0..200 {
                let snapshot = engine.snapshot();
                let rows: Vec<Statement> = snapshot
                    .scan(None, None)
                    .collect::<Result<_, _>>()
                    .unwrap();
                assert_eq!(rows.len(), 50);
                let old = rows.iter().filter(|s| s.subject.starts_with("ex:Old")).count();
                assert!(old == 0 || old == 50, "saw a half-replaced stanza");
            }
        });
        for round in 0..20 {
            let tag = if round % 2 == 0 { "New" } else { "Old" };
            engine.replace_all("onto", batch(tag)).unwrap();
        }
        reader.join().unwrap();
    });

    let outcome = engine.replace_all("onto", Vec::new()).unwrap();
    assert_eq!(outcome.previous, 50);
    assert_eq!(outcome.current, 0);
    assert_eq!(engine.info().statement_count, 0);
}

#[test]
fn failed_replace_keeps_previous_stanza() {
    let engine = test_engine();
    engine
        .replace_all("onto", vec![node("onto", "ex:A", "rdf:type", "owl:Class")])
        .unwrap();
    let mut bad = node("onto", "ex:B", "rdfs:label", "ex:C");
    bad.value = Some("both".into());
    let err = engine
        .replace_all("onto", vec![node("onto", "ex:B", "rdf:type", "owl:Class"), bad])
        .unwrap_err();
    assert!(matches!(
        err,
        OntoError::Store(StoreError::PartialReplaceFailure { .. })
    ));
    assert!(engine.classify("ex:A").is_ok());
    assert_eq!(engine.info().statement_count, 1);
}

#[test]
fn reified_axiom_and_annotation_relations() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "ex:A", "rdfs:subClassOf", "ex:B"),
            node("s1", "_:ax", "rdf:type", "owl:Axiom"),
            node("s1", "_:ax", "owl:annotatedSource", "ex:A"),
            node("s1", "_:ax", "owl:annotatedProperty", "rdfs:subClassOf"),
            node("s1", "_:ax", "owl:annotatedTarget", "ex:B"),
            Statement::literal("s1", "_:ax", "rdfs:comment", "from a textbook"),
        ])
        .unwrap();

    let axioms = engine.axioms().unwrap();
    assert_eq!(axioms.reified.len(), 1);
    assert_eq!(axioms.reified[0].id, "_:ax");
    assert_eq!(axioms.reified[0].statement.subject, "ex:A");

    let annotations = engine.relation("owl_axiom_annotation").unwrap();
    assert!(annotations.rows.iter().any(|row| {
        row[1].as_deref() == Some("rdfs:comment")
            && row[3].as_deref() == Some("from a textbook")
    }));
}

#[test]
fn every_catalog_relation_materializes() {
    let engine = test_engine();
    engine
        .ingest(vec![
            node("s1", "ex:A", "rdf:type", "owl:Class"),
            node("s1", "ex:A", "rdfs:subClassOf", "_:r"),
            node("s1", "_:r", "owl:onProperty", "ex:partOf"),
            node("s1", "_:r", "owl:someValuesFrom", "ex:Hand"),
            node("s1", "ex:B", "owl:equivalentClass", "_:i"),
            node("s1", "_:i", "owl:intersectionOf", "_:l1"),
            node("s1", "_:l1", "rdf:first", "ex:C"),
            node("s1", "_:l1", "rdf:rest", "rdf:nil"),
            Statement::literal("s1", "ex:Old", "owl:deprecated", "true"),
        ])
        .unwrap();

    let names: Vec<&str> = engine.schema().relations().iter().map(|r| r.name).collect();
    for name in names {
        let rows = engine.relation(name).unwrap();
        let width = engine.schema().get(name).unwrap().columns.len();
        assert!(
            rows.rows.iter().all(|row| row.len() == width),
            "{name} rows do not match its columns"
        );
    }

    let svf = engine.relation("owl_subclass_of_some_values_from").unwrap();
    assert_eq!(
        svf.rows,
        vec![vec![
            Some("ex:A".to_string()),
            Some("ex:partOf".to_string()),
            Some("ex:Hand".to_string()),
        ]]
    );
    let members = engine.relation("owl_equivalent_to_intersection_member").unwrap();
    assert_eq!(members.rows.len(), 1);
    assert_eq!(members.rows[0][2].as_deref(), Some("ex:C"));

    let list_members = engine.relation("rdf_list_member_statement").unwrap();
    assert_eq!(
        list_members.rows,
        vec![vec![
            Some("s1".to_string()),
            Some("_:l1".to_string()),
            Some("rdf:first".to_string()),
            Some("ex:C".to_string()),
            None,
            None,
            None,
        ]]
    );
    let rest = engine.relation("rdf_rest_transitive_statement").unwrap();
    assert_eq!(rest.rows.len(), 1);
    assert_eq!(rest.rows[0].len(), 7);
    assert_eq!(rest.rows[0][0].as_deref(), Some("s1"));
    assert_eq!(rest.rows[0][3].as_deref(), Some("rdf:nil"));

    let deprecated = engine.relation("deprecated_node").unwrap();
    assert_eq!(deprecated.rows, vec![vec![Some("ex:Old".to_string())]]);
}
