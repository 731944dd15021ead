
pub mod projection;
pub mod binrun;
pub mod histogram;
pub mod histogram_cache;

/*
    Self-tuning histograms are used as the estimation backend for range
    predicates on indexed fields. The appeal over classic scan-built
    histograms is that they never look at the data at all, so there is no
    analyze/vacuum style maintenance job to schedule and the estimates
    automatically track whatever distribution the workload actually queries.
    The price is that a histogram knows nothing about regions no query ever
    touches, which is fine for planning purposes since nobody asks about
    those regions anyway (and when somebody finally does, the feedback from
    that very query starts filling the gap).

    The approach follows Aboulnaga & Chaudhuri, "Self-tuning Histograms:
    Building Histograms Without Looking at Data" (SIGMOD '99): equi-width
    buckets with proportional damped error feedback, plus periodic
    restructuring via merge/split of bucket runs. One deliberate departure
    from the paper in the merge phase is documented at the merge loop.

    Everything in here is single-writer by design. The structures live in
    memory only and are rebuilt from scratch after a restart, which costs a
    few hundred queries of warmup and saves the whole
    persistence/invalidation problem. Histograms are one-dimensional: for a
    compound index only the first key field is modeled, the remaining fields
    are ignored (the update entry points warn once about that).
 */
