use anyhow::anyhow;
use clap::*;
use std::io::Write;
use std::path::Path;

use crate::cmd;
use crate::data_handling::export::{export, export_to_file, ExportFormat, ExportMetadata};
use crate::helper_functions::{display_stem, writer};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("export")
        .about("Filters, sorts and re-exports off-target hits")
        .after_help(
            r###"
Ingests a hit table, resolves unknown genomic contexts, applies the filter
and sort settings, then writes the view in one of four formats.

Formats:
* csv/tsv - ID, Chromosome, Position, Strand, Sequence, Mismatches,
            CFD_Score, Gene_Name, Region_Type
* bed     - track header, start = pos - 10, end = pos + 13,
            score = CFD x 1000
* json    - { metadata, hits }

Notes:
* The format defaults to the outfile extension, then csv
* Filter flags override the config file

Examples:
1. High-scoring exonic hits as BED:
   offtarget export hits.csv --min-score 0.5 --region EXON -o hits.bed

2. Hits on chromosomes 1 and 17 sorted by position, as JSON:
   offtarget export hits.tsv --chr 1 17 --sort POSITION --to json

"###,
        )
        .arg(cmd::infile_arg())
        .arg(cmd::merge_arg())
        .args(cmd::config_args())
        .args(cmd::filter_args())
        .arg(
            Arg::new("to")
                .long("to")
                .num_args(1)
                .value_parser(["csv", "tsv", "bed", "json"])
                .help("Output format"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .num_args(1)
                .help("Track or dataset name. Defaults to the input file stem"),
        )
        .arg(cmd::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = cmd::load_config(args)?;
    let mut session = cmd::load_session(args, &config)?;
    let outfile = cmd::arg_str(args, "outfile").unwrap_or("stdout");

    let format = match cmd::arg_str(args, "to") {
        Some(to) => to.parse::<ExportFormat>().map_err(|e| anyhow!(e))?,
        None => Path::new(outfile)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse::<ExportFormat>().ok())
            .unwrap_or(ExportFormat::Csv),
    };
    let name = match cmd::arg_str(args, "name") {
        Some(name) => name.to_string(),
        None => display_stem(cmd::arg_str(args, "infile").unwrap_or("stdin")),
    };

    let total = session.hits().len();
    let hits = session.view(&config.filter, config.sort).sorted.clone();
    tracing::info!(
        "Exporting {} of {} hits ({} / {})",
        hits.len(),
        total,
        config.filter.region,
        config.sort.as_str()
    );
    let metadata = ExportMetadata::new(&name, Some(config.guide.clone()), hits.len());

    if outfile == "stdout" {
        let mut writer = writer(outfile)?;
        export(&hits, format, &metadata, &mut writer)?;
        writer.flush()?;
    } else {
        export_to_file(&hits, format, &metadata, Path::new(outfile))?;
    }
    Ok(())
}
