use std::collections::HashMap;

use tracing::debug;

use crate::config::{HistogramConfig, HistogramConfigError};
use crate::statistics::histogram::{StHistogram, UpdateParams};
use crate::types::IndexKey;

/*
    Owns one histogram per index key pattern and hands observations through
    to them. Histograms come into existence lazily on the first update for
    their key (the planner asking for an estimate never creates one, it just
    gets nothing and falls back to its default heuristics).

    "Cache" is a slight misnomer, nothing is ever evicted or persisted - a
    histogram lives exactly as long as its cache entry. The map is not
    synchronized either: the host is expected to hold its collection-level
    lock across update() and to keep readers out while it does, same single
    writer discipline the rest of the statistics machinery assumes.
 */

pub struct HistogramCache {
    histograms: HashMap<IndexKey, StHistogram>,
    config: HistogramConfig,
}

impl HistogramCache {
    pub fn new() -> HistogramCache {
        // the compile time defaults are always valid
        HistogramCache {
            histograms: HashMap::new(),
            config: HistogramConfig::default(),
        }
    }

    pub fn with_config(config: HistogramConfig) -> Result<HistogramCache, HistogramConfigError> {
        config.validate()?;
        Ok(HistogramCache { histograms: HashMap::new(), config })
    }

    // lookup without mutation, the borrow is tied to the cache entry's lifetime
    pub fn get(&self, key: &IndexKey) -> Option<&StHistogram> {
        self.histograms.get(key)
    }

    // feed one query's feedback to the histogram for the key, creating the
    // histogram on first contact
    pub fn update(&mut self, key: &IndexKey, params: &UpdateParams) {
        let hist = self
            .histograms
            .entry(key.clone())
            .or_insert_with(|| StHistogram::build(&self.config));
        hist.update(params);
        debug!("histogram for {:?} after update:\n{}", key, hist);
    }
}

impl Default for HistogramCache {
    fn default() -> HistogramCache {
        HistogramCache::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::planner::IndexBounds;
    use crate::types::DomainValue;

    fn bounds(lo: f64, hi: f64) -> IndexBounds {
        IndexBounds::single_range(DomainValue::Double(lo), DomainValue::Double(hi))
    }

    #[test]
    fn get_does_not_create() {
        let cache = HistogramCache::new();
        assert!(cache.get(&IndexKey::single("age")).is_none());
    }

    #[test]
    fn update_creates_lazily_with_defaults() {
        let mut cache = HistogramCache::new();
        let key = IndexKey::single("age");
        let b = bounds(0.0, 50.0);
        cache.update(&key, &UpdateParams { bounds: &b, n_returned: 100 });

        let hist = cache.get(&key).expect("histogram should exist after first update");
        assert_eq!(hist.n_buckets(), 15);
        assert_eq!(hist.n_obs(), 1);
    }

    #[test]
    fn keys_get_separate_histograms() {
        let mut cache = HistogramCache::new();
        let age = IndexKey::single("age");
        let height = IndexKey::single("height");
        let b = bounds(-100.0, 200.0);
        cache.update(&age, &UpdateParams { bounds: &b, n_returned: 900 });
        cache.update(&height, &UpdateParams { bounds: &b, n_returned: 0 });

        let age_total = cache.get(&age).unwrap().total_freq();
        let height_total = cache.get(&height).unwrap().total_freq();
        assert!(age_total > height_total);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = HistogramConfig { size: 0, ..Default::default() };
        assert!(HistogramCache::with_config(config).is_err());
    }

    #[test]
    fn custom_config_shapes_new_histograms() {
        let config = HistogramConfig {
            size: 4,
            bin_init: 10.0,
            low_bound: 0.0,
            high_bound: 100.0,
            ..Default::default()
        };
        let mut cache = HistogramCache::with_config(config).unwrap();
        let key = IndexKey::single("age");
        let b = bounds(0.0, 100.0);
        cache.update(&key, &UpdateParams { bounds: &b, n_returned: 40 });
        assert_eq!(cache.get(&key).unwrap().n_buckets(), 4);
    }
}
