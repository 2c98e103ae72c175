//! Flat-file record I/O. A corpus is a sequence of two-line records,
//! a `>label` header followed by one sequence line.

use crate::PackedSequence;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FastaRecord {
    /// Record label, the header text after `>` up to the first whitespace.
    /// The reference corpus stores the mer's score here.
    pub label: String,
    /// Raw sequence text, case preserved.
    pub seq: String,
}

impl FastaRecord {
    pub fn new(label: &str, seq: &str) -> Self {
        Self {
            label: label.to_string(),
            seq: seq.to_string(),
        }
    }

    pub fn packed(&self) -> PackedSequence {
        PackedSequence::from_text(&self.seq)
    }
}

impl std::fmt::Display for FastaRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, ">{}\n{}", self.label, self.seq)
    }
}

/// Lazy corpus reader. Yields records in file order; I/O failures are
/// reported per record rather than up front.
pub struct Fasta<R: BufRead> {
    lines: io::Lines<R>,
}

impl Fasta<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let reader = File::open(path).map(BufReader::new)?;
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> Fasta<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

fn parse_label(header: &str) -> String {
    let trimmed = header.strip_prefix('>').unwrap_or(header);
    trimmed
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

impl<R: BufRead> Iterator for Fasta<R> {
    type Item = io::Result<FastaRecord>;
    fn next(&mut self) -> Option<Self::Item> {
        let header = match self.lines.next()? {
            Ok(line) => line,
            Err(why) => return Some(Err(why)),
        };
        let seq = match self.lines.next() {
            Some(Ok(line)) => line,
            Some(Err(why)) => return Some(Err(why)),
            None => {
                let why = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("header without sequence line: {}", header),
                );
                return Some(Err(why));
            }
        };
        Some(Ok(FastaRecord {
            label: parse_label(&header),
            seq,
        }))
    }
}

pub fn write_record<W: Write>(wtr: &mut W, record: &FastaRecord) -> io::Result<()> {
    writeln!(wtr, ">{}", record.label)?;
    writeln!(wtr, "{}", record.seq)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_two_line_records() {
        let input = b">12 extra note\nacgtacgt\n>read_2\nttttNgg\n" as &[u8];
        let records: Vec<_> = Fasta::new(input).collect::<io::Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], FastaRecord::new("12", "acgtacgt"));
        assert_eq!(records[1], FastaRecord::new("read_2", "ttttNgg"));
    }

    #[test]
    fn header_without_sequence_is_an_error() {
        let input = b">only_header\n" as &[u8];
        let mut fasta = Fasta::new(input);
        let err = fasta.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut fasta = Fasta::new(b"" as &[u8]);
        assert!(fasta.next().is_none());
    }

    #[test]
    fn write_round_trips() {
        let record = FastaRecord::new("42", "acgtn");
        let mut buf = Vec::new();
        write_record(&mut buf, &record).unwrap();
        let parsed: Vec<_> = Fasta::new(buf.as_slice())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn packed_view() {
        let record = FastaRecord::new("r", "ACGTx");
        assert_eq!(record.packed().to_text(), "acgtn");
    }
}
