use clap::*;
use std::io::Write;

use crate::analysis::risk::{RiskLevel, RiskSummary};
use crate::cmd;
use crate::helper_functions::writer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("summary")
        .about("Summarises risk over the filtered hits")
        .after_help(
            r###"
Counts high, medium and low risk hits, distinct chromosomes and critical
genes, and reports score statistics for the filtered view.

Notes:
* high   - score > 0.8, or any exonic hit
* medium - 0.4 < score <= 0.8 (an exonic 0.6 is counted in both)
* low    - score <= 0.4
* --per-hit lists every hit with its individual risk level

Examples:
1. Summary of a whole file:
   offtarget summary hits.csv

2. Per-hit risk for promoter hits, as JSON:
   offtarget summary hits.csv --region PROMOTER --per-hit --json

"###,
        )
        .arg(cmd::infile_arg())
        .arg(cmd::merge_arg())
        .args(cmd::config_args())
        .args(cmd::filter_args())
        .arg(
            Arg::new("per_hit")
                .long("per-hit")
                .action(ArgAction::SetTrue)
                .help("Also list the risk level of every hit"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Write the summary as JSON"),
        )
        .arg(cmd::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = cmd::load_config(args)?;
    let mut session = cmd::load_session(args, &config)?;
    let hits = session.view(&config.filter, config.sort).sorted.clone();
    let summary = RiskSummary::from_hits(&hits);
    let per_hit = args.get_flag("per_hit");

    let mut writer = writer(cmd::arg_str(args, "outfile").unwrap_or("stdout"))?;
    if args.get_flag("json") {
        let mut value = serde_json::to_value(&summary)?;
        if per_hit {
            let levels: Vec<_> = hits
                .iter()
                .map(|h| serde_json::json!({ "id": h.id, "risk": RiskLevel::assess(h).as_str() }))
                .collect();
            value["perHit"] = serde_json::Value::Array(levels);
        }
        serde_json::to_writer_pretty(&mut writer, &value)?;
        writeln!(writer)?;
        writer.flush()?;
        return Ok(());
    }

    writeln!(writer, "total\t{}", summary.total)?;
    writeln!(writer, "high\t{}", summary.high)?;
    writeln!(writer, "medium\t{}", summary.medium)?;
    writeln!(writer, "low\t{}", summary.low)?;
    writeln!(writer, "chromosomes\t{}", summary.chromosomes)?;
    match &summary.on_target {
        Some(hit) => writeln!(writer, "on_target\t{}\t{}:{}", hit.id, hit.chromosome, hit.position)?,
        None => writeln!(writer, "on_target\t-")?,
    }
    writeln!(writer, "critical_genes\t{}", summary.critical_genes.join(","))?;
    if let Some(stats) = &summary.scores {
        writeln!(
            writer,
            "score\tmean={:.4}\tmedian={:.4}\tsd={:.4}\tmin={:.4}\tmax={:.4}",
            stats.mean, stats.median, stats.std_dev, stats.min, stats.max
        )?;
    }
    if per_hit {
        for hit in &hits {
            writeln!(
                writer,
                "{}\t{}\t{}\t{:.4}\t{}",
                hit.id,
                hit.chromosome,
                hit.position,
                hit.cfd_score,
                RiskLevel::assess(hit).as_str()
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}
