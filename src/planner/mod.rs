/*
    Plan-side data model for index scans, as far as the statistics layer
    needs it: the bounds an index scan will traverse, plus the entry point
    the planner calls to turn those bounds into a cardinality estimate. The
    plan tree itself and the cost model consuming the estimates live with
    the host, this is just the contract between them and the histograms.
 */

use tracing::debug;

use crate::statistics::histogram_cache::HistogramCache;
use crate::types::{DomainValue, IndexKey};

// half-open [start, end) interval over the indexed domain
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: DomainValue,
    pub end: DomainValue,
}

impl Interval {
    pub fn new(start: DomainValue, end: DomainValue) -> Interval {
        Interval { start, end }
    }
}

// disjoint intervals, ascending by start
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedIntervalList {
    pub intervals: Vec<Interval>,
}

// one interval list per field of the (possibly compound) index key
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBounds {
    pub fields: Vec<OrderedIntervalList>,
}

impl IndexBounds {
    // the common case: a single range predicate on a single-field index
    pub fn single_range(start: DomainValue, end: DomainValue) -> IndexBounds {
        IndexBounds {
            fields: vec![OrderedIntervalList { intervals: vec![Interval::new(start, end)] }],
        }
    }
}

// Cardinality estimate for an index scan over the given bounds. None when no
// histogram has been built for the index yet, the planner falls back to its
// default selectivity heuristics in that case.
pub fn estimate_index_scan(
    cache: &HistogramCache,
    key: &IndexKey,
    bounds: &IndexBounds,
) -> Option<f64> {
    let hist = match cache.get(key) {
        Some(hist) => hist,
        None => {
            debug!("no histogram for index {:?} yet, no estimate", key);
            return None;
        }
    };
    Some(hist.freq_on_bounds(bounds))
}
