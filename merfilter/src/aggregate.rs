//! Parallel build and classify phases.
//!
//! Both phases cut the input into contiguous shards, one per worker, so
//! no state is shared inside the hot loop; the only synchronization point
//! is the barrier join at the end of the phase. Shard outputs are folded
//! back in shard-index order, which keeps the classify output in input
//! order and makes duplicate-key overwrites during the merge
//! deterministic.

use crate::classify;
use crate::{FilterError, FreqTable};
use rayon::prelude::*;
use records::{write_record, FastaRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Thresholds shared by every table of one run.
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    pub lower_level: u32,
    pub lower_interval: u32,
    pub ratio: f64,
}

impl FilterConfig {
    pub fn new(lower_level: u32, lower_interval: u32, ratio: f64) -> Self {
        Self {
            lower_level,
            lower_interval,
            ratio,
        }
    }

    pub fn table(&self) -> FreqTable {
        FreqTable::new(self.lower_level, self.lower_interval, self.ratio)
    }
}

/// Outcome of the build phase. A quarantined shard kept its partial
/// table; the entries are preserved on disk for manual inspection.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub merged_shards: usize,
    pub quarantined: Vec<PathBuf>,
}

fn shard_bounds(len: usize, workers: usize, index: usize) -> std::ops::Range<usize> {
    len * index / workers..len * (index + 1) / workers
}

fn shards(records: &[FastaRecord], workers: usize) -> Vec<&[FastaRecord]> {
    (0..workers)
        .map(|i| &records[shard_bounds(records.len(), workers, i)])
        .collect()
}

fn worker_pool(workers: usize) -> Result<rayon::ThreadPool, FilterError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|why| FilterError::WorkerPool(why.to_string()))
}

/// Build the frequency table from a reference corpus.
///
/// With more than one worker, each worker imports its own contiguous
/// shard into a private table; the partials merge in shard order after
/// the join. A shard whose merge fails is written under `quarantine_dir`
/// instead of being dropped, and the build continues.
pub fn build_table(
    records: &[FastaRecord],
    workers: usize,
    config: &FilterConfig,
    quarantine_dir: &Path,
) -> Result<(FreqTable, BuildReport), FilterError> {
    let workers = workers.max(1);
    let mut table = config.table();
    let mut report = BuildReport::default();
    if workers == 1 {
        if !table.import(records.iter().cloned()) {
            warn!("BUILD\tNothingImported");
        }
        report.merged_shards = 1;
        debug!("BUILD\tTableSize\t{}", table.len());
        return Ok((table, report));
    }

    debug!("BUILD\tShards\t{}", workers);
    let pool = worker_pool(workers)?;
    let partials: Vec<FreqTable> = pool.install(|| {
        shards(records, workers)
            .par_iter()
            .map(|shard| {
                let mut part = config.table();
                part.import(shard.iter().cloned());
                part
            })
            .collect()
    });

    for (index, part) in partials.into_iter().enumerate() {
        match table.can_merge(&part) {
            Ok(()) => {
                table.merge(part)?;
                report.merged_shards += 1;
            }
            Err(why) => {
                error!("BUILD\tQuarantine\t{}\t{}", index, why);
                let path = quarantine_shard(quarantine_dir, index, &part)?;
                report.quarantined.push(path);
            }
        }
    }
    debug!("BUILD\tTableSize\t{}", table.len());
    debug!("BUILD\tMerged\t{}\t{}", report.merged_shards, workers);
    Ok((table, report))
}

fn quarantine_shard(dir: &Path, index: usize, part: &FreqTable) -> Result<PathBuf, FilterError> {
    let path = dir.join(format!("merfil_quarantine_shard{}.fa", index));
    let mut wtr = File::create(&path).map(BufWriter::new)?;
    let mut entries: Vec<(String, u32)> = part
        .iter()
        .map(|(mer, score)| (mer.to_text(), score))
        .collect();
    // Stable file content across runs.
    entries.sort();
    for (mer, score) in entries {
        write_record(&mut wtr, &FastaRecord::new(&score.to_string(), &mer))?;
    }
    wtr.flush()?;
    Ok(path)
}

// Fan a per-record function out over contiguous shards against the
// finished, read-only table, then concatenate the private buffers in
// shard order.
fn map_shards<T, F>(
    records: &[FastaRecord],
    workers: usize,
    per_record: F,
) -> Result<Vec<T>, FilterError>
where
    T: Send,
    F: Fn(&FastaRecord) -> Option<T> + Sync,
{
    let workers = workers.max(1);
    if workers == 1 {
        return Ok(records.iter().filter_map(per_record).collect());
    }
    debug!("CLASSIFY\tShards\t{}", workers);
    let pool = worker_pool(workers)?;
    let buffers: Vec<Vec<T>> = pool.install(|| {
        shards(records, workers)
            .par_iter()
            .map(|shard| shard.iter().filter_map(&per_record).collect())
            .collect()
    });
    Ok(buffers.into_iter().flatten().collect())
}

/// Keep the query records accepted by the streak rule, in input order.
/// Records with an empty sequence are never emitted.
pub fn filter_records(
    table: &FreqTable,
    records: &[FastaRecord],
    workers: usize,
) -> Result<Vec<FastaRecord>, FilterError> {
    let kept = map_shards(records, workers, |record| {
        let read = record.packed();
        if read.is_empty() {
            return None;
        }
        if classify::accept(table, &read) {
            Some(record.clone())
        } else {
            None
        }
    })?;
    debug!("CLASSIFY\tKept\t{}\t{}", kept.len(), records.len());
    Ok(kept)
}

/// Average window score of every non-empty query record, in input order.
pub fn average_records(
    table: &FreqTable,
    records: &[FastaRecord],
    workers: usize,
) -> Result<Vec<(String, f64)>, FilterError> {
    map_shards(records, workers, |record| {
        let read = record.packed();
        if read.is_empty() {
            return None;
        }
        Some((record.label.clone(), classify::average(table, &read)))
    })
}
