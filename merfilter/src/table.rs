use crate::FilterError;
use records::{FastaRecord, PackedSequence};
use std::collections::HashMap;

/// Frequency table mapping a fixed-length mer to its score.
///
/// A mer and its base-pair complement count as the same signal, resolved
/// at lookup time rather than by storing a canonical key. The mer length
/// is frozen by the first stored entry; only definite mers are ever
/// stored, so the map never hashes an ambiguous key.
#[derive(Debug, Clone)]
pub struct FreqTable {
    mers: HashMap<PackedSequence, u32>,
    // 0 until the first entry freezes it.
    mer_length: usize,
    lower_level: u32,
    lower_interval: u32,
    ratio: f64,
}

impl FreqTable {
    pub fn new(lower_level: u32, lower_interval: u32, ratio: f64) -> Self {
        Self {
            mers: HashMap::new(),
            mer_length: 0,
            lower_level,
            lower_interval,
            ratio,
        }
    }

    /// Store a mer, overwriting any previous score.
    ///
    /// Non-definite or empty mers and scores at or below the lower level
    /// are not informative and return `Ok(false)` without touching the
    /// table. A length mismatch against the frozen mer length is a hard
    /// error: the caller fed mers of inconsistent size.
    pub fn insert(&mut self, mer: PackedSequence, score: u32) -> Result<bool, FilterError> {
        if mer.is_empty() || !mer.is_definite() || score <= self.lower_level {
            return Ok(false);
        }
        if self.mer_length == 0 {
            self.mer_length = mer.len();
        } else if mer.len() != self.mer_length {
            return Err(FilterError::MerLength {
                expected: self.mer_length,
                found: mer.len(),
            });
        }
        self.mers.insert(mer, score);
        Ok(true)
    }

    /// Bulk import of a reference corpus. A record's label carries its
    /// score; records with an unparsable label or a mismatched mer length
    /// are skipped. Returns whether at least one record was stored.
    pub fn import<I: IntoIterator<Item = FastaRecord>>(&mut self, records: I) -> bool {
        let mut inserted = false;
        for record in records {
            let score: u32 = match record.label.parse() {
                Ok(score) => score,
                Err(_) => {
                    debug!("IMPORT\tSkipScore\t{}", record.label);
                    continue;
                }
            };
            match self.insert(record.packed(), score) {
                Ok(flg) => inserted |= flg,
                Err(why) => debug!("IMPORT\tSkipMer\t{}\t{}", record.seq, why),
            }
        }
        inserted
    }

    /// Whether [merge](Self::merge) would succeed. Both tables must share
    /// the lower level, and frozen mer lengths must agree; an unfrozen
    /// side is compatible with anything.
    pub fn can_merge(&self, other: &FreqTable) -> Result<(), FilterError> {
        if self.lower_level != other.lower_level {
            return Err(FilterError::LowerLevel {
                left: self.lower_level,
                right: other.lower_level,
            });
        }
        if self.mer_length != 0 && other.mer_length != 0 && self.mer_length != other.mer_length {
            return Err(FilterError::MerLength {
                expected: self.mer_length,
                found: other.mer_length,
            });
        }
        Ok(())
    }

    /// Fold another table into this one, last writer wins on duplicates.
    pub fn merge(&mut self, other: FreqTable) -> Result<(), FilterError> {
        self.can_merge(&other)?;
        if self.mer_length == 0 {
            self.mer_length = other.mer_length;
        }
        self.mers.extend(other.mers);
        Ok(())
    }

    /// Score of a mer, falling back to its base-pair complement, then to
    /// `default`. Errors when the query length does not match the frozen
    /// mer length.
    pub fn lookup(&self, mer: &PackedSequence, default: u32) -> Result<u32, FilterError> {
        if mer.len() != self.mer_length {
            return Err(FilterError::MerLength {
                expected: self.mer_length,
                found: mer.len(),
            });
        }
        if let Some(&score) = self.mers.get(mer) {
            return Ok(score);
        }
        if let Some(&score) = self.mers.get(&mer.complement()) {
            return Ok(score);
        }
        Ok(default)
    }

    pub fn len(&self) -> usize {
        self.mers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mers.is_empty()
    }

    /// Frozen mer length, 0 while the table is still empty.
    pub fn mer_length(&self) -> usize {
        self.mer_length
    }

    pub fn lower_level(&self) -> u32 {
        self.lower_level
    }

    pub fn lower_interval(&self) -> u32 {
        self.lower_interval
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackedSequence, u32)> {
        self.mers.iter().map(|(mer, &score)| (mer, score))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mer(text: &str) -> PackedSequence {
        PackedSequence::from_text(text)
    }

    #[test]
    fn insert_freezes_length() {
        let mut table = FreqTable::new(0, 0, 1.0);
        assert_eq!(table.mer_length(), 0);
        assert!(table.insert(mer("acgt"), 5).unwrap());
        assert_eq!(table.mer_length(), 4);
        assert!(matches!(
            table.insert(mer("acg"), 5),
            Err(FilterError::MerLength { expected: 4, found: 3 })
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_rejects_low_and_ambiguous() {
        let mut table = FreqTable::new(10, 0, 1.0);
        assert!(!table.insert(mer("acgt"), 10).unwrap());
        assert!(!table.insert(mer("acnt"), 50).unwrap());
        assert!(!table.insert(mer(""), 50).unwrap());
        assert_eq!(table.len(), 0);
        // Low-score rejection does not freeze the length either.
        assert_eq!(table.mer_length(), 0);
        assert!(table.insert(mer("acgt"), 11).unwrap());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_overwrites() {
        let mut table = FreqTable::new(0, 0, 1.0);
        table.insert(mer("acgt"), 5).unwrap();
        table.insert(mer("acgt"), 9).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&mer("acgt"), 0).unwrap(), 9);
    }

    #[test]
    fn lookup_falls_back_to_complement() {
        let mut table = FreqTable::new(0, 0, 1.0);
        table.insert(mer("aacc"), 7).unwrap();
        // ttgg is the base-pair complement of aacc (no reversal).
        assert_eq!(table.lookup(&mer("ttgg"), 0).unwrap(), 7);
        assert_eq!(table.lookup(&mer("aacc"), 0).unwrap(), 7);
        assert_eq!(table.lookup(&mer("gggg"), 3).unwrap(), 3);
        assert!(matches!(
            table.lookup(&mer("aaccg"), 0),
            Err(FilterError::MerLength { expected: 4, found: 5 })
        ));
    }

    #[test]
    fn import_skips_bad_records() {
        let mut table = FreqTable::new(0, 0, 1.0);
        let records = vec![
            FastaRecord::new("not_a_number", "acgt"),
            FastaRecord::new("12", "acgt"),
            FastaRecord::new("9", "acg"),
            FastaRecord::new("5", "ancg"),
        ];
        assert!(table.import(records));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&mer("acgt"), 0).unwrap(), 12);
    }

    #[test]
    fn import_with_nothing_usable() {
        let mut table = FreqTable::new(0, 0, 1.0);
        let records = vec![
            FastaRecord::new("score", "acgt"),
            FastaRecord::new("", "acgt"),
        ];
        assert!(!table.import(records));
        assert!(table.is_empty());
    }

    #[test]
    fn merge_is_commutative_on_size() {
        let mut left = FreqTable::new(0, 0, 1.0);
        left.insert(mer("aaaa"), 4).unwrap();
        left.insert(mer("cccc"), 5).unwrap();
        let mut right = FreqTable::new(0, 0, 1.0);
        right.insert(mer("gggt"), 6).unwrap();

        let mut ab = left.clone();
        ab.merge(right.clone()).unwrap();
        let mut ba = right;
        ba.merge(left).unwrap();
        assert_eq!(ab.len(), 3);
        assert_eq!(ba.len(), 3);
    }

    #[test]
    fn merge_rejects_mismatched_lower_level() {
        let mut left = FreqTable::new(0, 0, 1.0);
        let right = FreqTable::new(1, 0, 1.0);
        assert!(matches!(
            left.merge(right),
            Err(FilterError::LowerLevel { left: 0, right: 1 })
        ));
    }

    #[test]
    fn merge_rejects_mismatched_length() {
        let mut left = FreqTable::new(0, 0, 1.0);
        left.insert(mer("acgt"), 5).unwrap();
        let mut right = FreqTable::new(0, 0, 1.0);
        right.insert(mer("acgta"), 5).unwrap();
        assert!(matches!(
            left.merge(right),
            Err(FilterError::MerLength { expected: 4, found: 5 })
        ));
    }

    #[test]
    fn merge_into_unfrozen_adopts_length() {
        let mut acc = FreqTable::new(0, 0, 1.0);
        let mut part = FreqTable::new(0, 0, 1.0);
        part.insert(mer("acgt"), 5).unwrap();
        acc.merge(part).unwrap();
        assert_eq!(acc.mer_length(), 4);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn merge_last_writer_wins() {
        let mut left = FreqTable::new(0, 0, 1.0);
        left.insert(mer("acgt"), 5).unwrap();
        let mut right = FreqTable::new(0, 0, 1.0);
        right.insert(mer("acgt"), 9).unwrap();
        left.merge(right).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left.lookup(&mer("acgt"), 0).unwrap(), 9);
    }
}
