use clap::*;
use serde_json::json;
use std::io::Write;

use crate::analysis::risk::gene_risk;
use crate::classifier::Classifier;
use crate::cmd;
use crate::data_handling::column_mapper::normalize_chromosome;
use crate::helper_functions::writer;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("classify")
        .about("Looks up the genomic context of one locus")
        .after_help(
            r###"
Classifies a single chromosome/position pair against the gene table as
EXON, INTRON, PROMOTER or INTERGENIC.

Notes:
* The first gene in table order whose body or promoter window covers the
  position decides the result
* Promoter wins over gene body; the window defaults to 2000 bp upstream
* Intergenic results report the distance to the nearest gene on the
  same chromosome

Examples:
1. Inside TP53:
   offtarget classify chr17 7676000

2. With a wider promoter window and a custom gene table:
   offtarget classify 12 25250000 --promoter-window 5000 --genes genes.json

"###,
        )
        .arg(
            Arg::new("chromosome")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Chromosome, with or without the chr prefix"),
        )
        .arg(
            Arg::new("position")
                .required(true)
                .num_args(1)
                .index(2)
                .value_parser(value_parser!(u64))
                .help("1-based position"),
        )
        .args(cmd::config_args())
        .arg(
            Arg::new("promoter_window")
                .long("promoter-window")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Upstream window counted as promoter, in bp"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Write the result as JSON"),
        )
        .arg(cmd::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = cmd::load_config(args)?;
    let reference = config.reference()?;
    let classifier = match cmd::arg_value::<u64>(args, "promoter_window") {
        Some(window) => Classifier::new(window),
        None => config.classifier(),
    };

    let chromosome = normalize_chromosome(cmd::arg_str(args, "chromosome").unwrap_or_default());
    let position = cmd::arg_value::<u64>(args, "position").unwrap_or_default();
    if reference.chromosome(&chromosome).is_none() {
        tracing::warn!("{} is not part of the reference assembly", chromosome);
    }

    let result = classifier.classify(&reference, &chromosome, position);
    let gene = result.gene.map(|g| g.gene_name.as_str());
    let risk = gene.map(gene_risk);

    let mut writer = writer(cmd::arg_str(args, "outfile").unwrap_or("stdout"))?;
    if args.get_flag("json") {
        let value = json!({
            "chromosome": chromosome,
            "position": position,
            "context": result.context,
            "gene": gene,
            "exonNumber": result.exon_number,
            "distanceToGene": result.distance_to_gene,
            "geneRisk": risk.map(|r| r.as_str()),
        });
        serde_json::to_writer_pretty(&mut writer, &value)?;
        writeln!(writer)?;
    } else {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            chromosome,
            position,
            result.context.as_str(),
            gene.unwrap_or("-"),
            result.exon_number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            result.distance_to_gene.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            risk.map(|r| r.as_str()).unwrap_or("-"),
        )?;
    }
    writer.flush()?;
    Ok(())
}
