use std::collections::BTreeMap;

use serde::Serialize;

use crate::destination::LinkDestination;
use crate::terms::Normalizer;

/// Inclusive bounds of the records sharing one term count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TermCountRange {
    pub start: usize,
    pub end: usize,
}

/// Immutable, sorted index of link destinations.
///
/// Records are ordered by `(num_terms, search_value)`; records with an equal key form an
/// unordered group. The term-count ranges are derived in the same constructor as the
/// ordering, so the two can never disagree.
#[derive(Clone, Debug, Default)]
pub struct DestinationIndex {
    destinations: Vec<LinkDestination>,
    ranges: BTreeMap<usize, TermCountRange>,
    max_num_terms: usize,
    normalizer: Normalizer,
}

impl DestinationIndex {
    /// Empty index whose queries normalize with `normalizer`.
    pub fn empty(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            ..Default::default()
        }
    }

    /// Sorts `destinations` and partitions them by term count.
    pub fn from_destinations(mut destinations: Vec<LinkDestination>, normalizer: Normalizer) -> Self {
        destinations.sort_by(LinkDestination::index_order);

        let max_num_terms = destinations.last().map(|d| d.num_terms).unwrap_or(0);

        let mut ranges: BTreeMap<usize, TermCountRange> = BTreeMap::new();
        for (idx, destination) in destinations.iter().enumerate() {
            ranges
                .entry(destination.num_terms)
                .and_modify(|range| range.end = idx)
                .or_insert(TermCountRange {
                    start: idx,
                    end: idx,
                });
        }

        Self {
            destinations,
            ranges,
            max_num_terms,
            normalizer,
        }
    }

    /// All destinations whose key equals `search_value` within the `num_terms` bucket.
    pub fn lookup(&self, search_value: &str, num_terms: usize) -> &[LinkDestination] {
        let Some(range) = self.ranges.get(&num_terms) else {
            return &[];
        };
        let Some(bucket) = self.destinations.get(range.start..=range.end) else {
            return &[];
        };

        let mut low = 0usize;
        let mut high = bucket.len();
        let mut hit = None;
        while low < high {
            let mid = low + (high - low) / 2;
            match bucket[mid].search_value.as_str().cmp(search_value) {
                std::cmp::Ordering::Equal => {
                    hit = Some(mid);
                    break;
                }
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid,
            }
        }
        let Some(mid) = hit else {
            return &[];
        };

        let mut first = mid;
        while first > 0 && bucket[first - 1].search_value == search_value {
            first -= 1;
        }
        let mut last = mid;
        while last + 1 < bucket.len() && bucket[last + 1].search_value == search_value {
            last += 1;
        }

        &bucket[first..=last]
    }

    /// Normalizes `term` the same way the indexed keys were normalized.
    pub fn normalize(&self, term: &str) -> String {
        self.normalizer.normalize(term)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn destinations(&self) -> &[LinkDestination] {
        &self.destinations
    }

    pub fn ranges(&self) -> &BTreeMap<usize, TermCountRange> {
        &self.ranges
    }

    pub fn range(&self, num_terms: usize) -> Option<TermCountRange> {
        self.ranges.get(&num_terms).copied()
    }

    pub fn max_num_terms(&self) -> usize {
        self.max_num_terms
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}
