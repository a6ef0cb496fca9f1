use anyhow::anyhow;
use clap::*;
use std::io::Write;
use std::path::Path;

use crate::cmd;
use crate::helper_functions::{display_stem, writer};
use crate::render::circos::render_circos;
use crate::render::ideogram::render_ideogram;
use crate::render::manhattan::render_manhattan;
use crate::render::{write_svg, PlotKind};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("render")
        .about("Draws the filtered hits as an SVG plot")
        .after_help(
            r###"
Projects the filtered and sorted view onto one of three plots and writes
the SVG markup.

Plots:
* circos    - chromosomes as arcs around a circle, hits placed by score,
              curves from the on-target site to high-scoring hits
* ideogram  - one horizontal bar per chromosome, hits placed by position
* manhattan - genome-wide score scatter

Notes:
* Hits on chromosomes missing from the assembly are not drawn
* --select highlights one hit and limits circos curves to it

Examples:
1. Circular overview:
   offtarget render hits.csv --plot circos -o circos.svg

2. Exonic hits on an ideogram, 1200x900:
   offtarget render hits.csv --plot ideogram --region EXON --width 1200 --height 900 -o ideogram.svg

"###,
        )
        .arg(cmd::infile_arg())
        .arg(cmd::merge_arg())
        .args(cmd::config_args())
        .args(cmd::filter_args())
        .arg(
            Arg::new("plot")
                .long("plot")
                .short('p')
                .num_args(1)
                .default_value("circos")
                .help("circos, ideogram or manhattan"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Panel width in px"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Panel height in px"),
        )
        .arg(
            Arg::new("padding")
                .long("padding")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Gap between circos arcs, in radians"),
        )
        .arg(
            Arg::new("select")
                .long("select")
                .num_args(1)
                .help("ID of the hit to highlight"),
        )
        .arg(cmd::outfile_arg())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = cmd::load_config(args)?;
    if let Some(width) = cmd::arg_value::<f64>(args, "width") {
        config.panel_width = width;
    }
    if let Some(height) = cmd::arg_value::<f64>(args, "height") {
        config.panel_height = height;
    }
    if let Some(padding) = cmd::arg_value::<f64>(args, "padding") {
        config.padding = padding;
    }
    config.validate()?;

    let kind = cmd::arg_str(args, "plot")
        .unwrap_or("circos")
        .parse::<PlotKind>()
        .map_err(|e| anyhow!(e))?;
    let selected = cmd::arg_str(args, "select");

    let mut session = cmd::load_session(args, &config)?;
    let hits = session.view(&config.filter, config.sort).sorted.clone();
    if let Some(id) = selected {
        if !hits.iter().any(|h| h.id == id) {
            tracing::warn!("Selected hit {} is not in the filtered view", id);
        }
    }

    let panel = config.panel();
    let markup = match kind {
        PlotKind::Circos => {
            let projection = session.polar(panel, config.padding, config.track_width);
            render_circos(&projection, &hits, selected)
        }
        PlotKind::Ideogram => render_ideogram(&session.linear(panel), &hits, selected),
        PlotKind::Manhattan => {
            let title = display_stem(cmd::arg_str(args, "infile").unwrap_or("stdin"));
            let size = (panel.width.round() as u32, panel.height.round() as u32);
            render_manhattan(session.reference(), &hits, size, &title)?
        }
    };
    tracing::info!("Rendered {} hits as {:?}", hits.len(), kind);

    match cmd::arg_str(args, "outfile").unwrap_or("stdout") {
        "stdout" => {
            let mut writer = writer("stdout")?;
            writer.write_all(markup.as_bytes())?;
            writer.flush()?;
        }
        path => write_svg(&markup, Path::new(path))?,
    }
    Ok(())
}
