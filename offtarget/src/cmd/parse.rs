use clap::*;
use serde::Serialize;
use std::io::Write;

use crate::cmd;
use crate::helper_functions::writer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("parse")
        .about("Ingests an off-target table and reports parse diagnostics")
        .after_help(
            r###"
Reads a delimited (comma, tab, semicolon or pipe) or BED file of off-target
hits, maps its columns and reports how many rows were accepted and why the
rest were rejected, one `error` line per rejected row.

Notes:
* Column names are matched case-insensitively against a synonym table
* Rows missing a chromosome or a valid position are rejected
* Missing sequences fall back to the guide; missing scores read as 0
* Reads from stdin if input file is 'stdin'

Examples:
1. Summarise a CRISPOR export:
   offtarget parse hits.tsv

2. Force BED parsing and emit the diagnostics as JSON:
   offtarget parse sites.txt --format bed --json

"###,
        )
        .arg(cmd::infile_arg())
        .args(cmd::config_args())
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Write the report as JSON"),
        )
        .arg(cmd::outfile_arg())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostics<'a> {
    file_name: Option<&'a str>,
    total: usize,
    parsed: usize,
    errors: usize,
    warnings: &'a [String],
    row_errors: &'a [String],
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = cmd::load_config(args)?;
    let session = cmd::load_session(args, &config)?;
    let mut writer = writer(cmd::arg_str(args, "outfile").unwrap_or("stdout"))?;

    let stats = session.parse_stats().unwrap_or_default();
    if args.get_flag("json") {
        let diagnostics = Diagnostics {
            file_name: session.file_name(),
            total: stats.total,
            parsed: stats.parsed,
            errors: stats.errors,
            warnings: session.warnings(),
            row_errors: session.row_errors(),
        };
        serde_json::to_writer_pretty(&mut writer, &diagnostics)?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "file\t{}", session.file_name().unwrap_or("-"))?;
        writeln!(writer, "total\t{}", stats.total)?;
        writeln!(writer, "parsed\t{}", stats.parsed)?;
        writeln!(writer, "errors\t{}", stats.errors)?;
        for warning in session.warnings() {
            writeln!(writer, "warning\t{}", warning)?;
        }
        for message in session.row_errors() {
            writeln!(writer, "error\t{}", message)?;
        }
    }
    writer.flush()?;
    Ok(())
}
