//! Pipeline -- one-shot build + classify driven by a TOML profile.
//!
//! The profile is the batch-friendly front end: everything a run needs is
//! a single file, so reruns and job schedulers stay reproducible.

use log::*;
use merfilter::aggregate::{average_records, build_table, filter_records, FilterConfig};
use merfilter::{FilterError, FreqTable};
use records::{write_record, Fasta, FastaRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Filter,
    Average,
}

/// Everything a run needs. Thresholds default to the permissive values
/// (`lower_level = 0`, `lower_interval = 0`, `ratio = 1.0`), worker
/// counts to 1.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    input_file: PathBuf,
    mer_file: PathBuf,
    output: PathBuf,
    mode: Mode,
    #[serde(default)]
    lower_level: u32,
    #[serde(default)]
    lower_interval: u32,
    #[serde(default = "default_ratio")]
    ratio: f64,
    #[serde(default = "default_workers")]
    build_threads: usize,
    #[serde(default = "default_workers")]
    classify_threads: usize,
    #[serde(default = "default_quarantine_dir")]
    quarantine_dir: PathBuf,
    #[serde(default)]
    dump_table: Option<PathBuf>,
    #[serde(default)]
    verbose: u8,
}

fn default_ratio() -> f64 {
    1.0
}

fn default_workers() -> usize {
    1
}

fn default_quarantine_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn run_pipeline(config: &PipelineConfig) -> io::Result<()> {
    let PipelineConfig {
        input_file,
        mer_file,
        output,
        mode,
        lower_level,
        lower_interval,
        ratio,
        build_threads,
        classify_threads,
        quarantine_dir,
        dump_table,
        verbose,
    } = config.clone();
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("START\tPipeline\t{:?}", mode);

    let filter_config = FilterConfig::new(lower_level, lower_interval, ratio);
    let mers = load_corpus(&mer_file)?;
    std::fs::create_dir_all(&quarantine_dir)?;
    let (table, report) =
        build_table(&mers, build_threads, &filter_config, &quarantine_dir).map_err(to_io)?;
    for path in report.quarantined.iter() {
        warn!("PIPELINE\tQuarantined\t{}", path.display());
    }
    debug!("PIPELINE\tTableSize\t{}", table.len());
    if let Some(path) = dump_table {
        dump_table_json(&path, &table)?;
    }

    let queries = load_corpus(&input_file)?;
    let mut wtr = File::create(&output).map(BufWriter::new)?;
    match mode {
        Mode::Filter => {
            let kept = filter_records(&table, &queries, classify_threads).map_err(to_io)?;
            for record in kept.iter() {
                write_record(&mut wtr, record)?;
            }
        }
        Mode::Average => {
            let averages = average_records(&table, &queries, classify_threads).map_err(to_io)?;
            for (label, average) in averages {
                writeln!(wtr, "{}\t{}", label, average)?;
            }
        }
    }
    wtr.flush()
}

pub fn load_corpus(path: &Path) -> io::Result<Vec<FastaRecord>> {
    let records: Vec<_> = Fasta::from_path(path)?.collect::<io::Result<_>>()?;
    debug!("LOAD\t{}\t{}", path.display(), records.len());
    Ok(records)
}

#[derive(Serialize)]
struct TableDump {
    lower_level: u32,
    mer_length: usize,
    entries: Vec<(String, u32)>,
}

/// Write the finished table as JSON, entries sorted by mer text.
pub fn dump_table_json(path: &Path, table: &FreqTable) -> io::Result<()> {
    let mut entries: Vec<(String, u32)> = table
        .iter()
        .map(|(mer, score)| (mer.to_text(), score))
        .collect();
    entries.sort();
    let dump = TableDump {
        lower_level: table.lower_level(),
        mer_length: table.mer_length(),
        entries,
    };
    let mut wtr = File::create(path).map(BufWriter::new)?;
    serde_json::to_writer(&mut wtr, &dump)?;
    wtr.flush()
}

pub fn to_io(why: FilterError) -> io::Error {
    match why {
        FilterError::Io(why) => why,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}
