/*
    oxidstats - self-tuning histogram statistics for query planning.

    The histograms in here never scan the indexed data. Instead every query
    that ran through an indexed range predicate reports back how many rows it
    actually returned and the histogram adjusts its per-bucket frequency
    estimates to shrink the gap between estimate and observation. Every couple
    hundred observations a histogram restructures itself so that bucket
    granularity migrates toward the hot regions of the value domain.

    The host database is expected to own one HistogramCache per collection,
    feed it observations from the executor and ask it for estimates from the
    planner. Nothing in here is synchronized, see the statistics module notes.
 */

pub mod types;
pub mod config;
pub mod statistics;
pub mod planner;
