//! Dataset statistics over processed rows.

use bigcq_gen::{Category, CategoryMap};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::pipeline::ProcessedRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Case-insensitive.
    pub unique_verbalizations: usize,
    /// Case-insensitive.
    pub unique_cqs: usize,
    pub unique_queries: usize,
    pub average_queries_per_cq: f64,
    pub average_cqs_per_query: f64,
    pub unique_cqs_per_category: CategoryMap<usize>,
    pub unique_queries_per_category: CategoryMap<usize>,
}

fn mean_set_size<K, V>(map: &HashMap<K, HashSet<V>>) -> f64 {
    if map.is_empty() {
        return 0.0;
    }
    map.values().map(HashSet::len).sum::<usize>() as f64 / map.len() as f64
}

impl Summary {
    pub fn compute(rows: &[ProcessedRow]) -> Self {
        let verbalizations: HashSet<String> =
            rows.iter().map(|r| r.verbalization.to_lowercase()).collect();

        let mut cqs: HashSet<String> = HashSet::new();
        let mut queries: HashSet<&str> = HashSet::new();
        let mut queries_per_cq: HashMap<String, HashSet<&str>> = HashMap::new();
        let mut cqs_per_query: HashMap<&str, HashSet<String>> = HashMap::new();
        let mut cqs_by_category: CategoryMap<HashSet<String>> = CategoryMap::default();
        let mut queries_by_category: CategoryMap<HashSet<&str>> = CategoryMap::default();

        for row in rows {
            for category in Category::ALL {
                let query = row.result.queries.get(category).as_deref();
                if let Some(q) = query {
                    queries.insert(q);
                    queries_by_category.get_mut(category).insert(q);
                    cqs_per_query.entry(q).or_default();
                }
                for cq in row.result.cqs.get(category) {
                    let cq = cq.to_lowercase();
                    cqs.insert(cq.clone());
                    cqs_by_category.get_mut(category).insert(cq.clone());
                    let per_cq = queries_per_cq.entry(cq.clone()).or_default();
                    if let Some(q) = query {
                        per_cq.insert(q);
                        cqs_per_query.entry(q).or_default().insert(cq);
                    }
                }
            }
        }

        Summary {
            unique_verbalizations: verbalizations.len(),
            unique_cqs: cqs.len(),
            unique_queries: queries.len(),
            average_queries_per_cq: mean_set_size(&queries_per_cq),
            average_cqs_per_query: mean_set_size(&cqs_per_query),
            unique_cqs_per_category: cqs_by_category.map(|_, s| s.len()),
            unique_queries_per_category: queries_by_category.map(|_, s| s.len()),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unique verbalizations: {}", self.unique_verbalizations)?;
        writeln!(f, "unique CQs:            {}", self.unique_cqs)?;
        writeln!(f, "unique queries:        {}", self.unique_queries)?;
        writeln!(f, "queries per CQ:        {:.3}", self.average_queries_per_cq)?;
        writeln!(f, "CQs per query:         {:.3}", self.average_cqs_per_query)?;
        writeln!(f, "per category (CQs / queries):")?;
        for category in Category::ALL {
            writeln!(
                f,
                "  {:<18} {:>8} / {}",
                category.as_str(),
                self.unique_cqs_per_category.get(category),
                self.unique_queries_per_category.get(category)
            )?;
        }
        Ok(())
    }
}
