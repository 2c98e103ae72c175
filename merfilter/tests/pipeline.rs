//! End-to-end run over an in-memory corpus: parse, build in parallel,
//! classify in parallel, and check the output against the sequential run.

use merfilter::aggregate::{average_records, build_table, filter_records, FilterConfig};
use records::{Fasta, FastaRecord};
use std::io;

fn parse(corpus: &str) -> Vec<FastaRecord> {
    Fasta::new(corpus.as_bytes())
        .collect::<io::Result<_>>()
        .unwrap()
}

fn test_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("merfil_it_{}_{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn fasta_to_filtered_fasta() {
    // Reference corpus: 3-mer scores; labels carry the score. The record
    // with a non-numeric label and the one with an ambiguous base are
    // skipped during import.
    let reference = "\
>40\naca\n\
>35\ncat\n\
>50\ntac\n\
>oops\nggg\n\
>60\nanc\n";
    let mers = parse(reference);
    assert_eq!(mers.len(), 5);

    let config = FilterConfig::new(10, 2, 2.0);
    let dir = test_dir("e2e");
    let (table, report) = build_table(&mers, 2, &config, &dir).unwrap();
    assert!(report.quarantined.is_empty());
    assert_eq!(table.mer_length(), 3);
    assert_eq!(table.len(), 3);

    // "acatac" windows: aca cat ata tac -> 40 35 10 50; one low score
    // never reaches the interval of 2, so the read is kept.
    // "gggggg" scores all default to the lower level -> kept by default.
    // The final read has a low run of length 2 and high windows whose
    // average is not twice the low average -> discarded.
    let queries = parse(
        "\
>keep_1\nacatac\n\
>keep_2\ngggggg\n\
>drop_1\nacattttcat\n",
    );
    for workers in [1usize, 3] {
        let kept = filter_records(&table, &queries, workers).unwrap();
        let labels: Vec<&str> = kept.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["keep_1", "keep_2"], "workers={}", workers);
    }

    let averages = average_records(&table, &queries, 1).unwrap();
    assert_eq!(averages.len(), 3);
    assert_eq!(averages[0].0, "keep_1");
    assert!((averages[0].1 - 33.75).abs() < 1e-9);
    assert_eq!(averages[1].1, 10.0);

    let parallel = average_records(&table, &queries, 3).unwrap();
    assert_eq!(averages, parallel);
    std::fs::remove_dir_all(&dir).unwrap();
}
