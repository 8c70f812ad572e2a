//! Summary statistics, recomputed from a snapshot on every call.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::OntoResult;
use crate::store::ScanFilter;
use crate::term::TermId;
use crate::view::Snapshot;

/// Which statistic to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticKind {
    /// Statement rows per predicate.
    PredicateUsage,
    /// Distinct `rdf:type` subjects per class.
    InstantiatedClasses,
    /// Distinct `rdfs:subClassOf` subjects per superclass.
    Subclasses,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 3] = [
        StatisticKind::PredicateUsage,
        StatisticKind::InstantiatedClasses,
        StatisticKind::Subclasses,
    ];

    pub fn relation_name(self) -> &'static str {
        match self {
            StatisticKind::PredicateUsage => "count_of_predicates",
            StatisticKind::InstantiatedClasses => "count_of_instantiated_classes",
            StatisticKind::Subclasses => "count_of_subclasses",
        }
    }

    pub fn from_relation_name(name: &str) -> Option<StatisticKind> {
        StatisticKind::ALL
            .into_iter()
            .find(|k| k.relation_name() == name)
    }
}

impl std::str::FromStr for StatisticKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predicates" | "predicate-usage" => Ok(StatisticKind::PredicateUsage),
            "instances" | "instantiated-classes" => Ok(StatisticKind::InstantiatedClasses),
            "subclasses" => Ok(StatisticKind::Subclasses),
            other => Err(format!(
                "unknown statistic '{other}', expected predicates, instances or subclasses"
            )),
        }
    }
}

/// One `(element, count_value)` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    pub element: String,
    pub count_value: u64,
}

/// Compute one statistic, keyed by element lexical form.
pub fn compute(snapshot: &Snapshot, kind: StatisticKind) -> OntoResult<BTreeMap<String, u64>> {
    let counts: HashMap<TermId, u64> = match kind {
        StatisticKind::PredicateUsage => {
            let mut counts = HashMap::new();
            for key in snapshot.scan_ids(ScanFilter::all()) {
                *counts.entry(key.predicate).or_insert(0) += 1;
            }
            counts
        }
        StatisticKind::InstantiatedClasses => {
            distinct_subjects_per_object(snapshot, snapshot.vocab().rdf_type)
        }
        StatisticKind::Subclasses => {
            distinct_subjects_per_object(snapshot, snapshot.vocab().rdfs_sub_class_of)
        }
    };

    let mut out = BTreeMap::new();
    for (element, count) in counts {
        out.insert(snapshot.resolve(element)?, count);
    }
    tracing::debug!(statistic = kind.relation_name(), elements = out.len(), "computed summary");
    Ok(out)
}

/// Rows for the statistic's relation, ordered by element.
pub fn rows(snapshot: &Snapshot, kind: StatisticKind) -> OntoResult<Vec<SummaryStatistic>> {
    Ok(compute(snapshot, kind)?
        .into_iter()
        .map(|(element, count_value)| SummaryStatistic {
            element,
            count_value,
        })
        .collect())
}

fn distinct_subjects_per_object(snapshot: &Snapshot, predicate: TermId) -> HashMap<TermId, u64> {
    let pairs: HashSet<(TermId, TermId)> = snapshot
        .scan_ids(ScanFilter::all().predicate(predicate))
        .filter_map(|key| key.object.map(|o| (o, key.subject)))
        .collect();
    let mut counts = HashMap::new();
    for (object, _) in pairs {
        *counts.entry(object).or_insert(0) += 1;
    }
    counts
}
