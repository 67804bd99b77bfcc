// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded fan-out for bulk (re)indexing.
//!
//! Loading a document means a metadata lookup, a content read and maybe an
//! extraction; tokenizing it is pure CPU. Both run per document on a
//! dedicated pool of `indexing_concurrency` threads. The results are
//! committed to the index afterwards, in one batch, by the caller.

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use tracing::warn;

/// Progress bar styled for reindexing.
#[cfg(feature = "parallel")]
pub fn reindex_progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .map(|s| s.progress_chars("━━╸"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(len).with_style(style);
    bar.set_prefix("Indexing");
    bar
}

/// Run `load` for every id on at most `concurrency` threads, keeping the
/// successes in input order. Each finished id advances `progress`.
#[cfg(feature = "parallel")]
pub fn load_all<T, F>(ids: &[String], concurrency: usize, progress: &ProgressBar, load: F) -> Vec<T>
where
    T: Send,
    F: Fn(&str) -> Option<T> + Sync,
{
    progress.set_length(ids.len() as u64);
    let run = || {
        ids.par_iter()
            .filter_map(|id| {
                let item = load(id);
                progress.inc(1);
                item
            })
            .collect::<Vec<T>>()
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, "could not start indexing pool, using the global pool");
            run()
        }
    }
}

/// Sequential fallback: run `load` for every id, keeping the successes.
#[cfg(not(feature = "parallel"))]
pub fn load_all<T, F>(ids: &[String], _concurrency: usize, load: F) -> Vec<T>
where
    F: Fn(&str) -> Option<T>,
{
    ids.iter().filter_map(|id| load(id)).collect()
}
