use crate::codeforces::model::ProblemKey;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// A filter paired with the ordering applied to the items it keeps.
pub trait FilterSort<T> {
    fn matches(&self, item: &T) -> bool;

    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Filters first, then sorts the survivors. The sort is stable, so items that
    /// compare equal keep their input order.
    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut selected: Vec<&T> = items.iter().filter(|item| self.matches(item)).collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}

/// Read-only view over the completed-problem flags.
pub trait CompletionLookup {
    fn is_completed(&self, key: &ProblemKey) -> bool;
}

impl CompletionLookup for BTreeMap<String, bool> {
    fn is_completed(&self, key: &ProblemKey) -> bool {
        self.get(&key.to_string()).copied().unwrap_or(false)
    }
}

impl CompletionLookup for HashMap<String, bool> {
    fn is_completed(&self, key: &ProblemKey) -> bool {
        self.get(&key.to_string()).copied().unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct FilterResultStats<P> {
    pub time: u32,
    pub total: u32,
    pub count: u32,
    pub params: P,
}

#[derive(Debug, Serialize)]
pub struct FilterResultResponse<P, D> {
    pub stats: FilterResultStats<P>,
    pub items: Vec<D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<P, D> FilterResultResponse<P, D> {
    pub fn new(params: P, total: usize, items: Vec<D>, time: u32) -> Self {
        let count = items.len() as u32;
        let message = if items.is_empty() {
            Some(String::from("no items matched the given filters"))
        } else {
            None
        };

        Self {
            stats: FilterResultStats {
                time,
                total: total as u32,
                count,
                params,
            },
            items,
            message,
        }
    }
}
