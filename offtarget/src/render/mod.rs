//! SVG writers over the projections. Geometry comes from the projection
//! values; these modules only turn it into markup.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::Result;

pub mod circos;
pub mod ideogram;
pub mod manhattan;

pub const BACKGROUND: &str = "#0f172a";
pub const LABEL_COLOR: &str = "#94a3b8";
pub const SELECTED_COLOR: &str = "#facc15";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Circos,
    Ideogram,
    Manhattan,
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "circos" | "polar" => Ok(PlotKind::Circos),
            "ideogram" | "linear" => Ok(PlotKind::Ideogram),
            "manhattan" => Ok(PlotKind::Manhattan),
            other => Err(format!("unknown plot kind '{}'", other)),
        }
    }
}

/// Radius of a hit marker: zero-mismatch hits are drawn larger.
pub(crate) fn marker_radius(mismatches: u32, selected: bool) -> f64 {
    let base = if mismatches == 0 { 5.0 } else { 3.0 };
    if selected {
        base + 3.0
    } else {
        base
    }
}

pub fn write_svg(markup: &str, path: &Path) -> Result<()> {
    info!("Writing SVG to: {}", path.display());
    fs::write(path, markup)?;
    Ok(())
}
