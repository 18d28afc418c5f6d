//! readscore [--queries file] [--dir dir] [--suffix s]* [--recursive] [--progress file] [--delimiter c] [--work n]
//!
//! Scores each query sequence against each read of the fasta files found in dir, and prints
//! for each query the histogram of scores.
//!
//! --queries : table with columns name and seq, read only if no checkpoint exists. Default query_sequences.csv
//!
//! --dir : directory containing fasta files. Default is current directory.
//!
//! --suffix : file name suffix of fasta files, can be repeated. Default .fas
//!
//! --recursive : look for fasta files in sub directories too.
//!
//! --progress : checkpoint file. If it exists the run resumes from it. Default progress.json
//!
//! --delimiter : delimiter of query table. Default ,
//!
//! --work : nb of query bases aligned between two checkpoints. Default 100000
//!
//! Logging goes to stderr, level is set by RUST_LOG (default info).
//! New best alignments are logged at info level.

use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

// for logging (debug mostly, switched at compile time in cargo.toml)
use env_logger::{Builder, Env};

use readscore::scorerun::run_dir;
use readscore::utils::{FileSelection, RunParams};

// install a logger facility
pub fn init_log() -> u64 {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    log::debug!("logger initialized");
    1
}

#[doc(hidden)]
fn parse_params(matches: &ArgMatches) -> anyhow::Result<RunParams> {
    let mut params = RunParams::default();
    //
    if let Some(queries) = matches.get_one::<String>("queries") {
        params.query_file = PathBuf::from(queries);
    }
    if let Some(dir) = matches.get_one::<String>("dir") {
        params.read_dir = PathBuf::from(dir);
    }
    if let Some(progress) = matches.get_one::<String>("progress") {
        params.progress_file = PathBuf::from(progress);
    }
    let suffixes: Vec<String> = match matches.get_many::<String>("suffix") {
        Some(values) => values.cloned().collect(),
        None => FileSelection::default().suffixes,
    };
    params.selection = FileSelection::new(suffixes, matches.get_flag("recursive"));
    //
    if let Some(delimiter) = matches.get_one::<String>("delimiter") {
        let delimiter = match delimiter.as_str() {
            "\\t" | "tab" => "\t",
            d => d,
        };
        if delimiter.len() != 1 {
            anyhow::bail!("delimiter must be a single ascii character, got {:?}", delimiter);
        }
        params.delimiter = delimiter.as_bytes()[0];
    }
    if let Some(work) = matches.get_one::<usize>("work") {
        if *work == 0 {
            anyhow::bail!("--work must be positive");
        }
        params.work_per_checkpoint = *work;
    }
    log::info!(
        "queries : {:?}, reads in {:?} with suffixes {:?}, checkpoint : {:?}",
        params.query_file,
        params.read_dir,
        params.selection.suffixes,
        params.progress_file
    );
    //
    Ok(params)
} // end of parse_params

//============================================================================================

fn main() -> anyhow::Result<()> {
    let _ = init_log();
    //
    let matches = Command::new("readscore")
        .version("0.1.0")
        .about("Local similarity histograms of query sequences against fasta reads, resumable")
        .arg(
            Arg::new("queries")
                .short('q')
                .long("queries")
                .value_name("QUERY_TABLE")
                .help("table with columns name and seq (fresh start only)"),
        )
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("DIRECTORY")
                .help("directory containing fasta files of reads"),
        )
        .arg(
            Arg::new("suffix")
                .short('s')
                .long("suffix")
                .value_name("SUFFIX")
                .action(ArgAction::Append)
                .help("file name suffix of fasta files, can be repeated"),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .action(ArgAction::SetTrue)
                .help("explore sub directories"),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .value_name("CHECKPOINT")
                .help("checkpoint file, resumed from if present"),
        )
        .arg(
            Arg::new("delimiter")
                .long("delimiter")
                .value_name("CHAR")
                .help("delimiter of query table"),
        )
        .arg(
            Arg::new("work")
                .long("work")
                .value_name("NB_BASES")
                .value_parser(value_parser!(usize))
                .help("nb of query bases aligned between two checkpoints"),
        )
        .get_matches();
    //
    let params = parse_params(&matches)?;
    let progress_file = params.progress_file.clone();
    let mut out = std::io::stdout().lock();
    let nb_reads = run_dir(params, &mut out)
        .with_context(|| format!("scoring run failed, last checkpoint in {:?}", progress_file))?;
    log::info!("done, {} reads scored", nb_reads);
    //
    Ok(())
} // end of main
