use std::fmt::Display;
use std::sync::Once;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::config::{HistogramConfig, HistogramConfigError};
use crate::planner::IndexBounds;
use crate::statistics::binrun::HistogramRun;
use crate::statistics::projection::Projection;

/*
    Self-tuning equi-width histogram in the style of "Self-tuning Histograms:
    Building Histograms Without Looking at Data" (Aboulnaga & Chaudhuri). The
    histogram starts out knowing nothing: equal-width buckets over a
    configured range, every bucket at the same initial frequency. From then
    on it learns purely from feedback. Whenever an index scan executes, the
    observed result size is compared against what the buckets would have
    predicted and the error is distributed across the touched buckets in
    proportion to their contribution, damped by alpha so a single weird query
    can't wreck the estimates.

    Bucket boundaries only ever move in restructure(): runs of buckets with
    near-equal frequency are merged to reclaim slots, and the reclaimed slots
    are used to split the hottest runs into finer pieces. Granularity thereby
    migrates toward the regions queries actually hit.

    A histogram covers exactly one type class (numeric). Ranges that cross a
    class boundary show up as non-finite widths through the Projection
    arithmetic and end the bucket walk.
 */

#[derive(Debug, Clone, Copy)]
struct Bucket {
    lo: Projection,
    hi: Projection,
    freq: f64,
}

// everything a histogram needs to learn from one executed query
pub struct UpdateParams<'a> {
    pub bounds: &'a IndexBounds,
    pub n_returned: usize,
}

pub struct StHistogram {
    buckets: Vec<Bucket>,
    total_freq: f64,
    n_obs: u64,
    config: HistogramConfig,
}

static MULTI_FIELD_WARN: Once = Once::new();

fn warn_multi_field() {
    MULTI_FIELD_WARN.call_once(|| {
        warn!("compound index bounds supplied, only the first key field is represented by the histogram");
    });
}

impl StHistogram {
    pub fn new(config: &HistogramConfig) -> Result<StHistogram, HistogramConfigError> {
        config.validate()?;
        Ok(StHistogram::build(config))
    }

    // only call with a validated config
    pub(crate) fn build(config: &HistogramConfig) -> StHistogram {
        let step = (config.high_bound - config.low_bound) / config.size as f64;
        let mut buckets = Vec::with_capacity(config.size);
        for i in 0..config.size {
            let lo = Projection::numeric(config.low_bound + step * i as f64);
            // the last bucket absorbs the accumulated step rounding so the
            // upper bound stays exact
            let hi = if i + 1 == config.size {
                Projection::numeric(config.high_bound)
            } else {
                Projection::numeric(config.low_bound + step * (i + 1) as f64)
            };
            buckets.push(Bucket { lo, hi, freq: config.bin_init });
        }
        StHistogram {
            buckets,
            total_freq: config.bin_init * config.size as f64,
            n_obs: 0,
            config: config.clone(),
        }
    }

    pub fn n_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn n_obs(&self) -> u64 {
        self.n_obs
    }

    // cached sum of all bucket frequencies. Accumulates floating point drift
    // between restructures, callers must not rely on tight equality.
    pub fn total_freq(&self) -> f64 {
        self.total_freq
    }

    // binary search for the bucket containing val. Buckets are contiguous
    // and ordered so this is the entry point for both estimation and update.
    fn start_idx(&self, val: Projection) -> Option<usize> {
        let mut lo = 0isize;
        let mut hi = self.buckets.len() as isize - 1;
        while lo <= hi {
            let probe = ((lo + hi) / 2) as usize;
            if val >= self.buckets[probe].lo {
                if val < self.buckets[probe].hi {
                    return Some(probe);
                }
                lo = probe as isize + 1;
            } else {
                hi = probe as isize - 1;
            }
        }
        None
    }

    // estimated number of rows in [lo, hi)
    pub fn freq_on_range(&self, lo: Projection, hi: Projection) -> f64 {
        if hi <= lo {
            return 0.0;
        }
        let start_idx = match self.start_idx(lo) {
            Some(idx) => idx,
            None => return 0.0,     // starts outside histogram coverage
        };
        let mut freq = 0.0;
        for bucket in &self.buckets[start_idx..] {
            let overlap = hi.min(bucket.hi) - lo.max(bucket.lo);
            if !overlap.is_finite() {
                // crossed a type class boundary, the range does not extend
                // meaningfully beyond here within this class
                return freq;
            }
            let frac = (overlap / (bucket.hi - bucket.lo)).max(0.0);
            freq += frac * bucket.freq;
            if frac == 0.0 {
                break;
            }
        }
        freq
    }

    // planner entry: aggregate estimate over the first key field's intervals.
    // Intervals with a non-numeric endpoint contribute nothing.
    pub fn freq_on_bounds(&self, bounds: &IndexBounds) -> f64 {
        let field = match bounds.fields.first() {
            Some(field) => field,
            None => return 0.0,
        };
        if bounds.fields.len() > 1 {
            warn_multi_field();
        }
        let mut agg = 0.0;
        for interval in &field.intervals {
            if interval.start.as_number().is_none() || interval.end.as_number().is_none() {
                debug!("skipping interval with non-numeric endpoint in selectivity estimate");
                continue;
            }
            agg += self.freq_on_range(
                Projection::from_value(&interval.start),
                Projection::from_value(&interval.end),
            );
        }
        agg
    }

    // Recalibrate from one executed query's feedback. Every merge_interval
    // observations the histogram restructures first, before the triggering
    // observation is folded in.
    pub fn update(&mut self, params: &UpdateParams) {
        self.n_obs += 1;
        if self.n_obs % self.config.merge_interval == self.config.merge_interval - 1 {
            self.restructure();
        }

        // only the first field of a compound key is represented
        let field = match params.bounds.fields.first() {
            Some(field) => field,
            None => return,
        };
        if params.bounds.fields.len() > 1 {
            warn_multi_field();
        }
        if field.intervals.is_empty() {
            return;
        }
        let share = (params.n_returned / field.intervals.len()) as f64;
        for interval in &field.intervals {
            let start = Projection::from_value(&interval.start);
            let end = Projection::from_value(&interval.end);
            self.update_range(start, end, share);
        }
    }

    // Phase A estimates the result size on [start, end) with the current
    // buckets, remembering which buckets the range touches. Phase B
    // distributes the estimation error across the touched buckets in
    // proportion to their current contribution, damped by alpha.
    fn update_range(&mut self, start: Projection, end: Projection, observed: f64) {
        let start_idx = match self.start_idx(start) {
            Some(idx) => idx,
            None => {
                debug!("update for a range outside histogram coverage, ignored");
                return;
            }
        };

        let mut est = 0.0;
        let mut touched = Vec::new();
        for (i, bucket) in self.buckets.iter().enumerate().skip(start_idx) {
            let min_intersect = start.max(bucket.lo);
            let max_intersect = end.min(bucket.hi);
            let width = max_intersect - min_intersect;
            if !width.is_finite() {
                break;      // crossed a type class boundary
            }
            let frac = (width / (bucket.hi - bucket.lo)).max(0.0);
            if frac == 0.0 {
                break;
            }
            est += bucket.freq * frac;
            // the error share uses an additive +1 smoothing of the fraction
            // against zero-width intersections
            let damp_frac = (max_intersect - min_intersect + 1.0) / ((bucket.hi - bucket.lo) + 1.0);
            touched.push((i, damp_frac));
        }

        if est == 0.0 {
            return;     // no basis for proportional attribution
        }

        let err = observed - est;
        for (i, damp_frac) in touched {
            let bucket = &mut self.buckets[i];
            let new_freq =
                (bucket.freq + damp_frac * self.config.alpha * err * bucket.freq / est).max(0.0);
            self.total_freq += new_freq - bucket.freq;
            bucket.freq = new_freq;
        }
    }

    // Reallocate bucket resolution: merge adjacent runs of near-equal
    // frequency, then split the hottest runs into the reclaimed slots. Bucket
    // count, range coverage and (up to split rounding) total frequency are
    // all preserved.
    pub fn restructure(&mut self) {
        let mut runs: Vec<HistogramRun> = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, b)| HistogramRun::new(i, b.freq, b.lo, b.hi))
            .collect();

        let mut reclaimed = self.merge_runs(&mut runs);

        // order for splitting: unmerged runs first, hottest first within each group
        runs.sort_by(|a, b| {
            a.is_merged()
                .cmp(&b.is_merged())
                .then(b.total_freq().total_cmp(&a.total_freq()))
        });
        self.split_runs(&mut runs, &mut reclaimed);
        debug_assert!(reclaimed.is_empty());

        // reassemble in range order and write back onto the bucket array
        runs.sort_by(|a, b| a.lo().cmp_total(&b.lo()));
        debug_assert_eq!(runs.len(), self.buckets.len());
        let mut total_freq = 0.0;
        for (bucket, run) in self.buckets.iter_mut().zip(runs.iter()) {
            bucket.lo = run.lo();
            bucket.hi = run.hi();
            bucket.freq = run.total_freq();
            total_freq += run.total_freq();
        }
        self.total_freq = total_freq;
    }

    // Repeatedly merge the adjacent pair of runs with the smallest maximum
    // frequency difference, until the difference exceeds the threshold or
    // splitting would have to eat into already-merged runs (the latter guard
    // departs from the published algorithm on purpose).
    fn merge_runs(&self, runs: &mut Vec<HistogramRun>) -> Vec<HistogramRun> {
        let mut reclaimed = Vec::new();
        let total_freq: f64 = runs.iter().map(|r| r.total_freq()).sum();

        loop {
            let n_unmerged = runs.iter().filter(|r| !r.is_merged()).count();
            if n_unmerged <= reclaimed.len() {
                break;
            }

            let diffs: Vec<f64> = runs
                .iter()
                .tuple_windows()
                .map(|(a, b)| a.max_diff(b))
                .collect();
            let best = match diffs.iter().copied().position_min_by(|a, b| a.total_cmp(b)) {
                Some(pos) => pos,
                None => break,      // single run left, nothing adjacent
            };
            if diffs[best] >= self.config.merge_threshold * total_freq {
                break;
            }

            let absorbed = runs.remove(best + 1);
            runs[best].absorb(&absorbed);
            reclaimed.push(absorbed);
        }
        reclaimed
    }

    // Hand every reclaimed slot to a split candidate, proportionally to the
    // candidates' frequencies. Candidates are processed coldest first so the
    // hottest one takes the remainder of the pile (and the rounding slack
    // with it).
    fn split_runs(&self, runs: &mut Vec<HistogramRun>, reclaimed: &mut Vec<HistogramRun>) {
        let n_candidates = (self.buckets.len() as f64 * self.config.split_threshold).ceil() as usize;
        let n_candidates = n_candidates.max(1).min(runs.len());
        let candidates: Vec<HistogramRun> = runs.drain(..n_candidates).collect();
        let full_freq: f64 = candidates.iter().map(|r| r.total_freq()).sum();
        let total_reclaimed = reclaimed.len();

        for (i, mut candidate) in candidates.into_iter().enumerate().rev() {
            let n_alloc = if i == 0 {
                reclaimed.len()     // last candidate processed takes everything left
            } else if full_freq > 0.0 {
                (total_reclaimed as f64 * candidate.total_freq() / full_freq) as usize
            } else {
                0
            };
            let mut spares: Vec<HistogramRun> = reclaimed.drain(..n_alloc).collect();
            candidate.split_into(&mut spares);
            runs.push(candidate);
            runs.append(&mut spares);
        }
    }
}

impl Display for StHistogram {
    // CSV lines lo,hi,freq - the only debug surface there is
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bucket in &self.buckets {
            writeln!(f, "{},{},{}", bucket.lo.magnitude, bucket.hi.magnitude, bucket.freq)?;
        }
        Ok(())
    }
}
