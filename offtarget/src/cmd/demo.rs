use anyhow::anyhow;
use clap::*;
use std::io::Write;
use std::path::Path;

use crate::cmd;
use crate::data_handling::export::{export, export_to_file, ExportFormat, ExportMetadata};
use crate::data_handling::samples::sample_hits;
use crate::guide::{GuideRna, EXAMPLE_GUIDES};
use crate::helper_functions::writer;
use crate::session::AnalysisSession;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("demo")
        .about("Emits the built-in sample hits or a mock analysis run")
        .after_help(
            r###"
Writes a ready-made hit set, useful for trying out the other subcommands.

Sets:
* sample - ten fixed hits for an EMX1 guide
* mock   - five TP53 anchor hits with jittered scores plus 150 low-risk
           hits across all chromosomes; the same seed gives the same set

Examples:
1. Sample set as CSV:
   offtarget demo -o sample.csv

2. Seeded mock run as CSV, piped into a summary:
   offtarget demo --mock --seed 7 --to csv | offtarget summary stdin

3. Start a config file from the defaults plus a custom guide:
   offtarget demo --guide GGTGAGTGAGTGTGTGCGTG --save-config offtarget.json

"###,
        )
        .args(cmd::config_args())
        .arg(
            Arg::new("mock")
                .long("mock")
                .action(ArgAction::SetTrue)
                .help("Generate a mock analysis instead of the fixed sample"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Mock analysis seed. Defaults to the config value"),
        )
        .arg(
            Arg::new("save_config")
                .long("save-config")
                .num_args(1)
                .help("Also write the effective viewer config to this JSON file"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .num_args(1)
                .default_value("csv")
                .value_parser(["csv", "tsv", "bed", "json"])
                .help("Output format"),
        )
        .arg(cmd::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = cmd::load_config(args)?;
    let format = cmd::arg_str(args, "to")
        .unwrap_or("csv")
        .parse::<ExportFormat>()
        .map_err(|e| anyhow!(e))?;

    if let Some(path) = cmd::arg_str(args, "save_config") {
        config.save(Path::new(path))?;
        tracing::info!("Wrote viewer config to: {}", path);
    }

    let mut session = AnalysisSession::new(config.reference()?, config.classifier());
    let (name, guide) = if args.get_flag("mock") {
        let seed = cmd::arg_value::<u64>(args, "seed").unwrap_or(config.mock_seed);
        session.run_mock_analysis(seed);
        ("mock_analysis", config.guide.clone())
    } else {
        session.set_hits(sample_hits());
        let (name, seq) = EXAMPLE_GUIDES
            .iter()
            .find(|(name, _)| name.starts_with("EMX1"))
            .copied()
            .unwrap_or(EXAMPLE_GUIDES[0]);
        ("sample", GuideRna::new(name, seq).with_target_gene("EMX1"))
    };

    let metadata = ExportMetadata::new(name, Some(guide), session.hits().len());
    let outfile = cmd::arg_str(args, "outfile").unwrap_or("stdout");
    if outfile == "stdout" {
        let mut writer = writer(outfile)?;
        export(session.hits(), format, &metadata, &mut writer)?;
        writer.flush()?;
    } else {
        export_to_file(session.hits(), format, &metadata, Path::new(outfile))?;
    }
    Ok(())
}
