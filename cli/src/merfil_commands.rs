use clap::{Arg, ArgAction, Command};

fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Debug mode")
}

fn corpus_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .long("input")
                .short('r')
                .value_name("READS")
                .required(true)
                .help("Query corpus (two-line FASTA)."),
        )
        .arg(
            Arg::new("mers")
                .long("mers")
                .short('k')
                .value_name("MERS")
                .required(true)
                .help("Reference corpus of scored mers; each label is the mer's score."),
        )
        .arg(
            Arg::new("lower_level")
                .long("lower-level")
                .short('f')
                .value_name("SCORE")
                .default_value("0")
                .help("Scores at or below this level count as low."),
        )
        .arg(
            Arg::new("lower_interval")
                .long("lower-interval")
                .short('m')
                .value_name("LEN")
                .default_value("0")
                .help("Length of a low-score run that trips the latch."),
        )
        .arg(
            Arg::new("ratio")
                .long("ratio")
                .short('t')
                .value_name("RATIO")
                .default_value("1.0")
                .help("High scores must exceed the low-run average by this factor."),
        )
        .arg(
            Arg::new("build_threads")
                .long("build-threads")
                .short('a')
                .value_name("NUM")
                .default_value("1")
                .help("Workers for the table build phase."),
        )
        .arg(
            Arg::new("classify_threads")
                .long("classify-threads")
                .short('b')
                .value_name("NUM")
                .default_value("1")
                .help("Workers for the classify phase."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .help("Output file. Defaults to stdout."),
        )
        .arg(
            Arg::new("quarantine_dir")
                .long("quarantine-dir")
                .value_name("DIR")
                .default_value(".")
                .help("Directory for unmergeable shard data."),
        )
        .arg(
            Arg::new("dump_table")
                .long("dump-table")
                .value_name("PATH")
                .help("Also write the built table as JSON."),
        )
}

fn subcommand_filter() -> Command {
    let command = Command::new("filter")
        .version("0.1")
        .about("Keep query records that pass the mer-frequency streak rule.")
        .arg(verbose_arg());
    corpus_args(command)
}

fn subcommand_average() -> Command {
    let command = Command::new("average")
        .version("0.1")
        .about("Report the average window score of each query record as TSV.")
        .arg(verbose_arg());
    corpus_args(command)
}

fn subcommand_pipeline() -> Command {
    Command::new("pipeline")
        .version("0.1")
        .about("Run a build+classify pipeline described by a TOML profile.")
        .arg(
            Arg::new("profile")
                .long("profile")
                .short('p')
                .value_name("TOML")
                .required(true)
                .help("Pipeline profile."),
        )
}

pub fn merfil_parser() -> Command {
    Command::new("merfil")
        .version("0.1.0")
        .about("Mer-frequency read filter.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(subcommand_filter())
        .subcommand(subcommand_average())
        .subcommand(subcommand_pipeline())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_filter_invocation() {
        let matches = merfil_parser().try_get_matches_from([
            "merfil", "filter", "-r", "reads.fa", "-k", "mers.fa", "-f", "10", "-m", "20", "-t",
            "2.0", "-a", "4", "-b", "2", "-vv",
        ]);
        let matches = matches.unwrap();
        let (name, sub_m) = matches.subcommand().unwrap();
        assert_eq!(name, "filter");
        assert_eq!(sub_m.get_count("verbose"), 2);
        assert_eq!(sub_m.get_one::<String>("lower_level").unwrap(), "10");
        assert_eq!(sub_m.get_one::<String>("quarantine_dir").unwrap(), ".");
    }

    #[test]
    fn missing_corpus_is_an_error() {
        let matches = merfil_parser().try_get_matches_from(["merfil", "average", "-r", "reads.fa"]);
        assert!(matches.is_err());
    }
}
