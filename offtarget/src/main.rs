extern crate clap;
use clap::*;
use tracing::info;

use crate::helper_functions::init_logging;

mod analysis;
mod classifier;
mod cmd;
mod config;
mod data_handling;
mod error;
mod guide;
mod helper_functions;
mod models;
mod projection;
mod reference;
mod render;
mod session;

fn main() -> anyhow::Result<()> {
    // Setup logging
    init_logging();

    let app = Command::new("offtarget")
        .version(crate_version!())
        .about("`offtarget` - CRISPR off-target ingestion, classification and genome plots")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd::parse::make_subcommand())
        .subcommand(cmd::classify::make_subcommand())
        .subcommand(cmd::export::make_subcommand())
        .subcommand(cmd::render::make_subcommand())
        .subcommand(cmd::summary::make_subcommand())
        .subcommand(cmd::demo::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Ingestion:
    * parse    - Read a delimited or BED table and report diagnostics
    * classify - Genomic context of a single locus

* Views:
    * export  - Filter, sort and write CSV/TSV/BED/JSON
    * render  - Circos, ideogram or Manhattan SVG
    * summary - Risk counts and score statistics

* Data:
    * demo - Built-in sample hits or a seeded mock analysis

Logging is controlled by RUST_LOG (default: info) and goes to stderr.

"###,
        );

    info!("Starting offtarget {}", crate_version!());

    // Check which subcommand the user ran...
    match app.get_matches().subcommand() {
        Some(("parse", sub_matches)) => cmd::parse::execute(sub_matches),
        Some(("classify", sub_matches)) => cmd::classify::execute(sub_matches),
        Some(("export", sub_matches)) => cmd::export::execute(sub_matches),
        Some(("render", sub_matches)) => cmd::render::execute(sub_matches),
        Some(("summary", sub_matches)) => cmd::summary::execute(sub_matches),
        Some(("demo", sub_matches)) => cmd::demo::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
