use merfil_cli::pipeline::{dump_table_json, load_corpus, to_io, Mode, PipelineConfig};
use merfilter::aggregate::{average_records, build_table, filter_records, FilterConfig};
use records::write_record;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = merfil_cli::merfil_commands::merfil_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path: &String = sub_m.get_one("profile").unwrap();
        use std::io::Read;
        let mut rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
        let mut file = String::new();
        rdr.read_to_string(&mut file)?;
        let config: PipelineConfig = toml::from_str(&file)
            .map_err(|why| io::Error::new(io::ErrorKind::InvalidData, why.to_string()))?;
        return merfil_cli::pipeline::run_pipeline(&config);
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        let level = match sub_m.get_count("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    match matches.subcommand() {
        Some(("filter", sub_m)) => run(sub_m, Mode::Filter),
        Some(("average", sub_m)) => run(sub_m, Mode::Average),
        _ => unreachable!(),
    }
}

fn run(matches: &clap::ArgMatches, mode: Mode) -> io::Result<()> {
    debug!("START\t{:?}", mode);
    let lower_level: u32 = matches
        .get_one("lower_level")
        .and_then(|e: &String| e.parse().ok())
        .expect("lower level");
    let lower_interval: u32 = matches
        .get_one("lower_interval")
        .and_then(|e: &String| e.parse().ok())
        .expect("lower interval");
    let ratio: f64 = matches
        .get_one("ratio")
        .and_then(|e: &String| e.parse().ok())
        .expect("ratio");
    let build_threads = worker_count(matches, "build_threads");
    let classify_threads = worker_count(matches, "classify_threads");
    let config = FilterConfig::new(lower_level, lower_interval, ratio);

    let mers_file: &String = matches.get_one("mers").unwrap();
    let mers = load_corpus(Path::new(mers_file))?;
    let quarantine_dir: &String = matches.get_one("quarantine_dir").unwrap();
    let quarantine_dir = PathBuf::from(quarantine_dir);
    std::fs::create_dir_all(&quarantine_dir)?;
    let (table, report) = build_table(&mers, build_threads, &config, &quarantine_dir).map_err(to_io)?;
    for path in report.quarantined.iter() {
        warn!("BUILD\tQuarantined\t{}", path.display());
    }
    debug!("BUILD\tTableSize\t{}", table.len());
    if let Some(path) = matches.get_one::<String>("dump_table") {
        dump_table_json(Path::new(path), &table)?;
    }

    let input_file: &String = matches.get_one("input").unwrap();
    let queries = load_corpus(Path::new(input_file))?;
    let sink: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let mut wtr = BufWriter::new(sink);
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

fn worker_count(matches: &clap::ArgMatches, name: &str) -> usize {
    let workers: usize = matches
        .get_one(name)
        .and_then(|e: &String| e.parse().ok())
        .expect("worker count");
    workers.max(1)
}
