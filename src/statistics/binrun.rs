use crate::statistics::projection::Projection;

/*
    Transient grouping of adjacent buckets used while a histogram
    restructures itself. The merge pass collapses neighboring runs whose
    frequencies barely differ, reclaiming their bucket slots; the split pass
    hands those slots back to the hottest runs. Runs only live for the
    duration of one restructure() call.

    Runs are plain values in a dense Vec, merging transfers fields and drops
    the absorbed run into the reclaimed pile. (The classic formulation
    shuffles runs around linked lists and erases while iterating, which is
    exactly the kind of aliasing the borrow checker is right to hate.)
 */

#[derive(Debug, Clone)]
pub struct HistogramRun {
    // original bucket indices covered by this run
    buckets: Vec<usize>,
    freq_lo: f64,
    freq_hi: f64,
    total_freq: f64,
    lo: Projection,
    hi: Projection,
}

impl HistogramRun {
    pub fn new(bucket: usize, freq: f64, lo: Projection, hi: Projection) -> HistogramRun {
        HistogramRun {
            buckets: vec![bucket],
            freq_lo: freq,
            freq_hi: freq,
            total_freq: freq,
            lo,
            hi,
        }
    }

    pub fn total_freq(&self) -> f64 {
        self.total_freq
    }

    pub fn lo(&self) -> Projection {
        self.lo
    }

    pub fn hi(&self) -> Projection {
        self.hi
    }

    // a run counts as merged as soon as it covers more than one original bucket
    pub fn is_merged(&self) -> bool {
        self.buckets.len() > 1
    }

    // maximum frequency difference between a bucket of this run and a bucket
    // of the other one. The merge pass minimizes this over adjacent pairs.
    pub fn max_diff(&self, other: &HistogramRun) -> f64 {
        (other.freq_hi - self.freq_lo).max(self.freq_hi - other.freq_lo)
    }

    // absorb the adjacent run into this one
    pub fn absorb(&mut self, other: &HistogramRun) {
        self.buckets.extend_from_slice(&other.buckets);
        self.total_freq += other.total_freq;
        self.freq_lo = self.freq_lo.min(other.freq_lo);
        self.freq_hi = self.freq_hi.max(other.freq_hi);
        self.lo = self.lo.min(other.lo);
        self.hi = self.hi.max(other.hi);
    }

    // Divide this run's range and mass evenly across itself and the supplied
    // spare runs. The run keeps the first piece, the last piece ends at the
    // exact previous hi so that coverage never drifts through rounding.
    pub fn split_into(&mut self, spares: &mut [HistogramRun]) {
        let n_pieces = (spares.len() + 1) as f64;
        let piece_freq = self.total_freq / n_pieces;
        let step = (self.hi - self.lo) / n_pieces;
        let class = self.lo.class;
        let lo_magnitude = self.lo.magnitude;
        let orig_lo = self.lo;
        let orig_hi = self.hi;
        let n_spares = spares.len();

        let boundary = |k: usize| Projection { class, magnitude: lo_magnitude + step * k as f64 };

        let first_hi = if n_spares == 0 { orig_hi } else { boundary(1) };
        self.reset(piece_freq, orig_lo, first_hi);
        for (i, spare) in spares.iter_mut().enumerate() {
            let hi = if i + 1 == n_spares { orig_hi } else { boundary(i + 2) };
            spare.reset(piece_freq, boundary(i + 1), hi);
        }
    }

    fn reset(&mut self, freq: f64, lo: Projection, hi: Projection) {
        self.freq_lo = freq;
        self.freq_hi = freq;
        self.total_freq = freq;
        self.lo = lo;
        self.hi = hi;
    }
}
