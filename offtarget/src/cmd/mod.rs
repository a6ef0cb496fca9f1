//! Subcommand modules for the `offtarget` binary, plus the arguments and
//! set-up they share.

use std::path::Path;

use anyhow::{anyhow, bail};
use clap::*;
use tracing::{info, warn};

use crate::analysis::derivation::{RegionFilter, SortKey};
use crate::config::ViewerConfig;
use crate::data_handling::{ingest, ingest_file, InputFormat, ParseReport};
use crate::guide::GuideRna;
use crate::helper_functions::{display_stem, read_input};
use crate::session::AnalysisSession;

pub mod classify;
pub mod demo;
pub mod export;
pub mod parse;
pub mod render;
pub mod summary;

pub fn infile_arg() -> Arg {
    Arg::new("infile")
        .required(true)
        .num_args(1)
        .index(1)
        .help("Delimited or BED file of off-target hits. [stdin] for screen input")
}

pub fn outfile_arg() -> Arg {
    Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

pub fn config_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .long("config")
            .short('c')
            .num_args(1)
            .help("Viewer config JSON. Defaults to $OFFTARGET_CONFIG, then <project root>/offtarget.json"),
        Arg::new("guide")
            .long("guide")
            .short('g')
            .num_args(1)
            .help("Guide sequence used as fallback sequence and for mismatch estimation"),
        Arg::new("pam")
            .long("pam")
            .num_args(1)
            .help("PAM recorded with the guide in exports. Defaults to NGG"),
        Arg::new("format")
            .long("format")
            .num_args(1)
            .value_parser(["csv", "tsv", "txt", "bed"])
            .help("Input format. Detected from extension and content when omitted"),
        Arg::new("genes")
            .long("genes")
            .num_args(1)
            .help("JSON gene table replacing the built-in annotations"),
    ]
}

pub fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("min_score")
            .long("min-score")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Keep hits with score >= this value"),
        Arg::new("max_mismatches")
            .long("max-mismatches")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Keep hits with at most this many mismatches"),
        Arg::new("region")
            .long("region")
            .num_args(1)
            .help("ALL, EXON, INTRON, PROMOTER, INTERGENIC or UNKNOWN"),
        Arg::new("chromosome")
            .long("chr")
            .num_args(1..)
            .action(ArgAction::Append)
            .help("Restrict to these chromosomes (e.g. 1 17 chrX)"),
        Arg::new("sort")
            .long("sort")
            .num_args(1)
            .help("SCORE_DESC, SCORE_ASC, MISMATCH_ASC or POSITION"),
    ]
}

/// Resolves the config file, then lays command-line overrides on top.
pub fn load_config(args: &ArgMatches) -> anyhow::Result<ViewerConfig> {
    let explicit = arg_str(args, "config").map(Path::new);
    let mut config = ViewerConfig::resolve(explicit)?;

    if let Some(seq) = arg_str(args, "guide") {
        config.guide = GuideRna::new("cli", seq);
        if !config.guide.is_valid() {
            warn!(
                "Guide '{}' is {} nt after sanitising, expected 20",
                seq,
                config.guide.sequence.len()
            );
        }
    }
    if let Some(pam) = arg_str(args, "pam") {
        config.guide = config.guide.clone().with_pam(pam);
    }
    if let Some(path) = arg_str(args, "genes") {
        config.gene_table = Some(path.into());
    }
    if let Some(v) = arg_value::<f64>(args, "min_score") {
        config.filter.min_score = v;
    }
    if let Some(v) = arg_value::<u32>(args, "max_mismatches") {
        config.filter.max_mismatches = v;
    }
    if let Some(region) = arg_str(args, "region") {
        config.filter.region = RegionFilter::from(region);
        if let RegionFilter::Unrecognized(name) = &config.filter.region {
            warn!("Region '{}' matches no genomic context; the view will be empty", name);
        }
    }
    if let Some(chromosomes) = arg_many(args, "chromosome") {
        config.filter = config.filter.with_chromosomes(&chromosomes);
    }
    if let Some(sort) = arg_str(args, "sort") {
        config.sort = sort.parse::<SortKey>().map_err(|e| anyhow!(e))?;
    }
    config.validate()?;
    Ok(config)
}

pub fn merge_arg() -> Arg {
    Arg::new("merge")
        .long("merge")
        .num_args(1..)
        .action(ArgAction::Append)
        .help("Further hit files appended to the input, e.g. one per guide run")
}

fn read_report(
    infile: &str,
    format: Option<InputFormat>,
    guide: Option<&str>,
) -> anyhow::Result<ParseReport> {
    let report = if infile == "stdin" {
        info!("Reading off-target hits from: stdin");
        let content = read_input(infile)?;
        let format = format.unwrap_or_else(|| InputFormat::detect(Path::new(infile), &content));
        ingest(&content, format, guide)
    } else {
        ingest_file(Path::new(infile), format, guide)?
    };
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    for error in report.errors.iter().take(20) {
        warn!("{}", error);
    }
    Ok(report)
}

/// Reads the input file into a fresh session, then appends any `--merge`
/// files. A fatal ingestion error in any of them aborts the command.
pub fn load_session(args: &ArgMatches, config: &ViewerConfig) -> anyhow::Result<AnalysisSession> {
    let infile = arg_str(args, "infile").unwrap_or("stdin");
    let format = arg_str(args, "format")
        .map(|f| f.parse::<InputFormat>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let guide = Some(config.guide.sequence.as_str());

    let report = read_report(infile, format, guide)?;
    let mut session = AnalysisSession::new(config.reference()?, config.classifier());
    session.import(&display_stem(infile), report);
    if let Some(error) = session.error() {
        bail!("{}", error);
    }

    for extra in arg_many(args, "merge").unwrap_or_default() {
        let report = read_report(&extra, format, guide)?;
        if report.fatal {
            bail!("{}: {}", extra, report.errors.join("; "));
        }
        info!("Merging {} hits from {}", report.hits.len(), extra);
        session.add_hits(report.hits);
    }
    Ok(session)
}

pub fn arg_str<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a str> {
    args.try_get_one::<String>(id).ok().flatten().map(String::as_str)
}

pub fn arg_value<T: Clone + Send + Sync + 'static>(args: &ArgMatches, id: &str) -> Option<T> {
    args.try_get_one::<T>(id).ok().flatten().cloned()
}

pub fn arg_many(args: &ArgMatches, id: &str) -> Option<Vec<String>> {
    args.try_get_many::<String>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
}
