//! Accept/reject decision over the per-window scores of a query.
//!
//! The rule is deliberately asymmetric: a query is rejected only when a
//! sustained run of low-scoring windows was observed AND the high-scoring
//! windows are not proportionally higher than that run's own average. A
//! plain "mostly low" threshold would discard reads whose low stretch is
//! a local artifact surrounded by strong evidence.

use crate::FreqTable;
use records::PackedSequence;

/// Score of every definite window of the table's mer length, left to
/// right. Windows containing an ambiguous base contribute nothing.
/// Empty when the table is unfrozen or the query is shorter than a mer.
pub fn score_list(table: &FreqTable, query: &PackedSequence) -> Vec<u32> {
    let k = table.mer_length();
    if k == 0 || query.len() < k {
        return Vec::new();
    }
    let mut scores = Vec::with_capacity(query.len() - k + 1);
    for start in 0..=(query.len() - k) {
        // Bounds are checked above. Never panic.
        let window = query.substring(start, k).unwrap();
        if !window.is_definite() {
            continue;
        }
        let score = table.lookup(&window, table.lower_level()).unwrap();
        scores.push(score);
    }
    scores
}

/// The streak rule. `lower_count` acts as a latch: high scores reset it
/// only while it is still below `lower_interval`, so once a contiguous
/// low run of that length has been seen, the latch stays tripped for the
/// rest of the scan.
pub fn accept_scores(table: &FreqTable, scores: &[u32]) -> bool {
    if scores.is_empty() {
        return false;
    }
    let (mut lower_count, mut upper_count) = (0u32, 0u64);
    let (mut lower_total, mut upper_total) = (0u64, 0u64);
    for &score in scores {
        if score <= table.lower_level() {
            lower_count += 1;
            lower_total += u64::from(score);
        } else {
            upper_count += 1;
            upper_total += u64::from(score);
            if lower_count < table.lower_interval() {
                lower_count = 0;
            }
        }
    }
    if upper_count == 0 {
        // No informative high-score evidence at all; keep by default.
        return true;
    }
    if lower_count < table.lower_interval() {
        return true;
    }
    let upper_average = upper_total as f64 / upper_count as f64;
    let lower_average = match lower_count {
        0 => 0.0,
        _ => lower_total as f64 / f64::from(lower_count),
    };
    upper_average < lower_average * table.ratio()
}

/// Arithmetic mean of the scores, 0 for an empty list.
pub fn average_scores(scores: &[u32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    total as f64 / scores.len() as f64
}

pub fn accept(table: &FreqTable, query: &PackedSequence) -> bool {
    accept_scores(table, &score_list(table, query))
}

pub fn average(table: &FreqTable, query: &PackedSequence) -> f64 {
    average_scores(&score_list(table, query))
}
