//! RDF list reconstruction.
//!
//! List nodes are the subjects of `rdf:first` or `rdf:rest`. A head is a list
//! node that no `rdf:rest` points at. Each head is walked iteratively with a
//! visited set, so a cyclic chain costs at most one pass over its nodes.
//! Malformed lists are reported and left out of both the list and the
//! rest-transitive projections; other lists are unaffected.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::OntoResult;
use crate::finding::{Finding, FindingReport, ListDefect};
use crate::store::ScanFilter;
use crate::term::{TermId, TermKind};
use crate::view::Snapshot;

/// One well-formed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfList {
    /// Stanza of the head's `rdf:first` statement.
    pub stanza: String,
    pub head: String,
    /// `rdf:first` values in chain order.
    pub members: Vec<String>,
    /// Kind of each member; literals belong in a value column.
    pub member_kinds: Vec<TermKind>,
}

/// A node reachable from a list head by one or more `rdf:rest` hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestHop {
    pub stanza: String,
    pub head: String,
    pub node: String,
}

/// Output of one reconstruction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMaterialization {
    /// Well-formed lists, ordered by head.
    pub lists: Vec<RdfList>,
    /// Every node reachable from a well-formed list's head, `rdf:nil` included.
    pub rest_transitive: Vec<RestHop>,
    pub findings: FindingReport,
}

impl ListMaterialization {
    /// Members of the list rooted at `head`.
    pub fn members_of(&self, head: &str) -> Option<&[String]> {
        self.lists
            .iter()
            .find(|l| l.head == head)
            .map(|l| l.members.as_slice())
    }
}

/// The `rdf:first`/`rdf:rest` adjacency of a snapshot.
struct Links {
    first: BTreeMap<TermId, Vec<TermId>>,
    rest: BTreeMap<TermId, Vec<TermId>>,
    /// Lowest stanza id carrying an `rdf:first` of each node.
    first_stanza: BTreeMap<TermId, TermId>,
    nil: TermId,
}

impl Links {
    fn gather(snapshot: &Snapshot) -> Self {
        let v = snapshot.vocab();
        let mut first: BTreeMap<TermId, Vec<TermId>> = BTreeMap::new();
        let mut first_stanza = BTreeMap::new();
        for key in snapshot.scan_ids(ScanFilter::all().predicate(v.rdf_first)) {
            if let Some(target) = key.target() {
                first.entry(key.subject).or_default().push(target);
                first_stanza
                    .entry(key.subject)
                    .and_modify(|s: &mut TermId| *s = (*s).min(key.stanza))
                    .or_insert(key.stanza);
            }
        }
        let mut rest: BTreeMap<TermId, Vec<TermId>> = BTreeMap::new();
        for key in snapshot.scan_ids(ScanFilter::all().predicate(v.rdf_rest)) {
            if let Some(target) = key.target() {
                rest.entry(key.subject).or_default().push(target);
            }
        }
        // The same link asserted in two stanzas is still one link.
        for targets in first.values_mut().chain(rest.values_mut()) {
            targets.sort_unstable();
            targets.dedup();
        }
        Self {
            first,
            rest,
            first_stanza,
            nil: v.rdf_nil,
        }
    }

    fn is_list_node(&self, node: TermId) -> bool {
        self.first.contains_key(&node) || self.rest.contains_key(&node)
    }

    fn list_nodes(&self) -> BTreeSet<TermId> {
        self.first.keys().chain(self.rest.keys()).copied().collect()
    }

    /// Mark everything downstream of `from` along any `rdf:rest` branch.
    fn mark_downstream(&self, from: TermId, visited: &mut HashSet<TermId>) {
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            for next in self.rest.get(&node).into_iter().flatten() {
                if visited.insert(*next) {
                    stack.push(*next);
                }
            }
        }
    }

    /// Whether following `rdf:rest` from `from` ever comes back to it.
    fn on_cycle(&self, from: TermId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            for next in self.rest.get(&node).into_iter().flatten() {
                if *next == from {
                    return true;
                }
                if seen.insert(*next) {
                    stack.push(*next);
                }
            }
        }
        false
    }
}

/// Result of walking one chain.
enum Walk {
    Complete {
        members: Vec<TermId>,
        reached: Vec<TermId>,
    },
    Malformed {
        at: TermId,
        defect: ListDefect,
    },
}

fn walk(links: &Links, head: TermId, visited: &mut HashSet<TermId>) -> Walk {
    let mut members = Vec::new();
    let mut reached = Vec::new();
    let mut seen = HashSet::new();
    let mut current = head;
    while current != links.nil {
        visited.insert(current);
        if !seen.insert(current) {
            return Walk::Malformed {
                at: current,
                defect: ListDefect::Cycle,
            };
        }
        let (Some(firsts), Some(rests)) = (links.first.get(&current), links.rest.get(&current))
        else {
            let defect = if links.first.contains_key(&current) {
                ListDefect::MissingRest
            } else {
                ListDefect::MissingFirst
            };
            return Walk::Malformed { at: current, defect };
        };
        let ([member], [next]) = (firsts.as_slice(), rests.as_slice()) else {
            return Walk::Malformed {
                at: current,
                defect: ListDefect::Branching,
            };
        };
        if *next != links.nil && !links.is_list_node(*next) {
            return Walk::Malformed {
                at: *next,
                defect: ListDefect::Unterminated,
            };
        }
        members.push(*member);
        reached.push(*next);
        current = *next;
    }
    Walk::Complete { members, reached }
}

/// Reconstruct every list of the snapshot.
pub fn materialize_lists(snapshot: &Snapshot) -> OntoResult<ListMaterialization> {
    let links = Links::gather(snapshot);
    let list_nodes = links.list_nodes();
    let pointed_at: HashSet<TermId> = links.rest.values().flatten().copied().collect();

    let mut heads = Vec::new();
    for node in &list_nodes {
        if !pointed_at.contains(node) {
            heads.push((snapshot.resolve(*node)?, *node));
        }
    }
    heads.sort();

    let mut out = ListMaterialization::default();
    let mut visited = HashSet::new();
    for (head_lexical, head) in heads {
        match walk(&links, head, &mut visited) {
            Walk::Complete { members, reached } => {
                let stanza = match links.first_stanza.get(&head) {
                    Some(stanza) => snapshot.resolve(*stanza)?,
                    None => continue,
                };
                let member_kinds = members
                    .iter()
                    .map(|m| snapshot.kind(*m))
                    .collect::<OntoResult<Vec<_>>>()?;
                let members = members
                    .into_iter()
                    .map(|m| snapshot.resolve(m))
                    .collect::<OntoResult<Vec<_>>>()?;
                for node in reached {
                    out.rest_transitive.push(RestHop {
                        stanza: stanza.clone(),
                        head: head_lexical.clone(),
                        node: snapshot.resolve(node)?,
                    });
                }
                out.lists.push(RdfList {
                    stanza,
                    head: head_lexical,
                    members,
                    member_kinds,
                });
            }
            Walk::Malformed { at, defect } => {
                // The tail past the defect belongs to this list, not to an
                // unreachable cycle.
                links.mark_downstream(at, &mut visited);
                tracing::debug!(head = %head_lexical, %defect, "malformed list");
                out.findings.push(Finding::MalformedList {
                    head: head_lexical,
                    at: snapshot.resolve(at)?,
                    defect,
                });
            }
        }
    }

    // Nodes no head reached hang off a headless cycle; report each cycle once.
    let mut orphans = Vec::new();
    for node in list_nodes.iter().filter(|n| !visited.contains(n)) {
        orphans.push((snapshot.resolve(*node)?, *node));
    }
    orphans.sort();
    for (lexical, node) in orphans {
        if visited.contains(&node) || !links.on_cycle(node) {
            continue;
        }
        visited.insert(node);
        links.mark_downstream(node, &mut visited);
        out.findings.push(Finding::MalformedList {
            head: lexical.clone(),
            at: lexical,
            defect: ListDefect::Cycle,
        });
    }

    if !out.findings.is_empty() {
        tracing::warn!(malformed = out.findings.len(), "malformed lists excluded");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::TermInterner;
    use crate::prefix::PrefixMap;
    use crate::statement::StatementKey;
    use crate::store::StatementStore;
    use crate::vocab::Vocabulary;
    use std::sync::Arc;

    fn snapshot_of(triples: &[(&str, &str, &str)]) -> Snapshot {
        let interner = Arc::new(TermInterner::new());
        let vocab = Arc::new(Vocabulary::resolve(&interner).unwrap());
        let store = StatementStore::new();
        let stanza = interner.intern("t", TermKind::Iri).unwrap();
        for (s, p, o) in triples {
            store.insert(StatementKey {
                stanza,
                subject: interner.intern_node(s).unwrap(),
                predicate: interner.intern_node(p).unwrap(),
                object: Some(interner.intern_node(o).unwrap()),
                value: None,
                datatype: None,
                language: None,
            });
        }
        Snapshot::new(store.snapshot(), interner, vocab, Arc::new(PrefixMap::standard()))
    }

    #[test]
    fn single_member_list() {
        let snap = snapshot_of(&[("_:l1", "rdf:first", "ex:X"), ("_:l1", "rdf:rest", "rdf:nil")]);
        let out = materialize_lists(&snap).unwrap();
        assert_eq!(
            out.lists,
            vec![RdfList {
                stanza: "t".into(),
                head: "_:l1".into(),
                members: vec!["ex:X".into()],
                member_kinds: vec![TermKind::Iri],
            }]
        );
        assert_eq!(
            out.rest_transitive,
            vec![RestHop {
                stanza: "t".into(),
                head: "_:l1".into(),
                node: "rdf:nil".into(),
            }]
        );
        assert!(out.findings.is_empty());
    }

    #[test]
    fn three_member_list_in_order() {
        let snap = snapshot_of(&[
            ("_:a", "rdf:first", "ex:A"),
            ("_:a", "rdf:rest", "_:b"),
            ("_:b", "rdf:first", "ex:B"),
            ("_:b", "rdf:rest", "_:c"),
            ("_:c", "rdf:first", "ex:C"),
            ("_:c", "rdf:rest", "rdf:nil"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert_eq!(out.members_of("_:a").unwrap(), ["ex:A", "ex:B", "ex:C"]);
        assert_eq!(out.lists.len(), 1);
        let reached: Vec<&str> = out.rest_transitive.iter().map(|hop| hop.node.as_str()).collect();
        assert_eq!(reached, ["_:b", "_:c", "rdf:nil"]);
    }

    #[test]
    fn cycle_reachable_from_head_is_reported() {
        let snap = snapshot_of(&[
            ("_:h", "rdf:first", "ex:A"),
            ("_:h", "rdf:rest", "_:m"),
            ("_:m", "rdf:first", "ex:B"),
            ("_:m", "rdf:rest", "_:n"),
            ("_:n", "rdf:first", "ex:C"),
            ("_:n", "rdf:rest", "_:m"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert!(out.lists.is_empty());
        assert!(out.rest_transitive.is_empty());
        assert!(matches!(
            out.findings.findings(),
            [Finding::MalformedList { head, defect: ListDefect::Cycle, .. }] if head == "_:h"
        ));
    }

    #[test]
    fn headless_cycle_is_reported_once() {
        let snap = snapshot_of(&[
            ("_:x", "rdf:first", "ex:A"),
            ("_:x", "rdf:rest", "_:y"),
            ("_:y", "rdf:first", "ex:B"),
            ("_:y", "rdf:rest", "_:x"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert!(out.lists.is_empty());
        assert!(matches!(
            out.findings.findings(),
            [Finding::MalformedList { head, defect: ListDefect::Cycle, .. }] if head == "_:x"
        ));
    }

    #[test]
    fn defects_do_not_affect_other_lists() {
        let snap = snapshot_of(&[
            ("_:bad", "rdf:first", "ex:A"),
            ("_:bad", "rdf:rest", "ex:NotAList"),
            ("_:branch", "rdf:first", "ex:A"),
            ("_:branch", "rdf:first", "ex:B"),
            ("_:branch", "rdf:rest", "rdf:nil"),
            ("_:norest", "rdf:first", "ex:A"),
            ("_:good", "rdf:first", "ex:G"),
            ("_:good", "rdf:rest", "rdf:nil"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert_eq!(out.lists.len(), 1);
        assert_eq!(out.lists[0].head, "_:good");
        let defects: Vec<ListDefect> = out
            .findings
            .findings()
            .iter()
            .filter_map(|f| match f {
                Finding::MalformedList { defect, .. } => Some(*defect),
                _ => None,
            })
            .collect();
        assert_eq!(
            defects,
            [ListDefect::Unterminated, ListDefect::Branching, ListDefect::MissingRest]
        );
    }

    fn defects_of(out: &ListMaterialization) -> Vec<(String, ListDefect)> {
        out.findings
            .findings()
            .iter()
            .filter_map(|f| match f {
                Finding::MalformedList { at, defect, .. } => Some((at.clone(), *defect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn branching_head_with_well_formed_tail_is_one_finding() {
        let snap = snapshot_of(&[
            ("_:h", "rdf:first", "ex:A"),
            ("_:h", "rdf:first", "ex:B"),
            ("_:h", "rdf:rest", "_:t"),
            ("_:t", "rdf:first", "ex:C"),
            ("_:t", "rdf:rest", "rdf:nil"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert!(out.lists.is_empty());
        assert_eq!(defects_of(&out), [("_:h".to_string(), ListDefect::Branching)]);
        assert_eq!(out.findings.malformed_lists(), 1);
    }

    #[test]
    fn head_without_first_and_well_formed_tail_is_one_finding() {
        let snap = snapshot_of(&[
            ("_:h", "rdf:rest", "_:t"),
            ("_:t", "rdf:first", "ex:C"),
            ("_:t", "rdf:rest", "rdf:nil"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert!(out.lists.is_empty());
        assert!(out.rest_transitive.is_empty());
        assert_eq!(defects_of(&out), [("_:h".to_string(), ListDefect::MissingFirst)]);
        assert_eq!(out.findings.malformed_lists(), 1);
    }

    #[test]
    fn every_branch_past_a_defect_is_marked() {
        let snap = snapshot_of(&[
            ("_:h", "rdf:first", "ex:A"),
            ("_:h", "rdf:rest", "_:m"),
            ("_:m", "rdf:first", "ex:B"),
            ("_:m", "rdf:rest", "_:n"),
            ("_:m", "rdf:rest", "_:o"),
            ("_:n", "rdf:first", "ex:C"),
            ("_:n", "rdf:rest", "rdf:nil"),
            ("_:o", "rdf:first", "ex:D"),
            ("_:o", "rdf:rest", "rdf:nil"),
        ]);
        let out = materialize_lists(&snap).unwrap();
        assert!(out.lists.is_empty());
        assert_eq!(defects_of(&out), [("_:m".to_string(), ListDefect::Branching)]);
    }
}
