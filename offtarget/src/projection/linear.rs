use serde::Serialize;

use crate::models::OffTargetHit;
use crate::projection::{PanelSize, Point, Projection};
use crate::reference::GenomeReference;

const AXIS_TICK_STEP: u64 = 50_000_000;
const AXIS_TICK_MAX: u64 = 250_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self { top: 40.0, right: 30.0, bottom: 50.0, left: 60.0 }
    }
}

/// Horizontal band for one chromosome, in panel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lane {
    pub chromosome: String,
    pub label: String,
    pub y: f64,
    pub height: f64,
    pub bar_width: f64,
    pub centromere_x: Option<f64>,
}

impl Lane {
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Ideogram layout: one shared bp->x scale over `[0, max chromosome length]`
/// so bars stay proportional, and one band per chromosome in genome order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearProjection {
    panel: PanelSize,
    margin: Margin,
    inner_width: f64,
    inner_height: f64,
    max_length: u64,
    lanes: Vec<Lane>,
}

impl LinearProjection {
    pub const BAND_PADDING: f64 = 0.4;

    pub fn new(reference: &GenomeReference, panel: PanelSize) -> Self {
        Self::with_margin(reference, panel, Margin::default())
    }

    pub fn with_margin(reference: &GenomeReference, panel: PanelSize, margin: Margin) -> Self {
        let inner_width = (panel.width - margin.left - margin.right).max(0.0);
        let inner_height = (panel.height - margin.top - margin.bottom).max(0.0);
        let max_length = reference.max_length();

        let mut projection = Self {
            panel,
            margin,
            inner_width,
            inner_height,
            max_length,
            lanes: Vec::new(),
        };

        let n = reference.chromosomes().len() as f64;
        let p = Self::BAND_PADDING;
        let step = inner_height / (n - p + 2.0 * p).max(1.0);
        let start = (inner_height - step * (n - p)) * 0.5;
        let band = step * (1.0 - p);

        projection.lanes = reference
            .chromosomes()
            .iter()
            .enumerate()
            .map(|(i, chr)| Lane {
                chromosome: chr.id.clone(),
                label: chr.name.clone(),
                y: margin.top + start + step * i as f64,
                height: band,
                bar_width: projection.scale(chr.length),
                centromere_x: chr.centromere_position.map(|c| projection.x(c)),
            })
            .collect();
        projection
    }

    /// Width in px for a span of `bp` base pairs.
    pub fn scale(&self, bp: u64) -> f64 {
        if self.max_length == 0 {
            return 0.0;
        }
        bp as f64 / self.max_length as f64 * self.inner_width
    }

    /// Panel x of a genomic position.
    pub fn x(&self, position: u64) -> f64 {
        self.margin.left + self.scale(position)
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, chromosome: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.chromosome == chromosome)
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn inner_size(&self) -> (f64, f64) {
        (self.inner_width, self.inner_height)
    }

    /// Fixed Mb ticks for the bottom axis.
    pub fn axis_ticks(&self) -> Vec<(f64, String)> {
        (0..=AXIS_TICK_MAX)
            .step_by(AXIS_TICK_STEP as usize)
            .map(|bp| (self.x(bp), format!("{}Mb", bp / 1_000_000)))
            .collect()
    }
}

impl Projection for LinearProjection {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn panel(&self) -> PanelSize {
        self.panel
    }

    fn locate(&self, hit: &OffTargetHit) -> Option<Point> {
        let lane = self.lane(&hit.chromosome)?;
        Some(Point {
            x: self.x(hit.position),
            y: lane.center_y(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projection(width: f64, height: f64) -> LinearProjection {
        LinearProjection::new(&GenomeReference::hg38(), PanelSize::new(width, height))
    }

    #[test]
    fn longest_chromosome_spans_inner_width() {
        let p = projection(800.0, 600.0);
        let (inner_w, _) = p.inner_size();
        assert_relative_eq!(inner_w, 710.0);
        assert_relative_eq!(p.lane("chr1").unwrap().bar_width, inner_w);
        let chr21 = p.lane("chr21").unwrap().bar_width;
        assert_relative_eq!(chr21, 46_709_983.0 / 248_956_422.0 * inner_w, epsilon = 1e-9);
    }

    #[test]
    fn lanes_follow_genome_order_without_overlap() {
        let p = projection(800.0, 600.0);
        let lanes = p.lanes();
        assert_eq!(lanes.len(), 24);
        assert_eq!(lanes[0].chromosome, "chr1");
        assert_eq!(lanes[23].chromosome, "chrY");
        for w in lanes.windows(2) {
            assert!(w[0].y + w[0].height < w[1].y);
        }
        let (_, inner_h) = p.inner_size();
        let margin = p.margin();
        assert!(lanes[0].y >= margin.top);
        assert!(lanes[23].y + lanes[23].height <= margin.top + inner_h + 1e-9);
    }

    #[test]
    fn hits_land_on_lane_center() {
        let p = projection(800.0, 600.0);
        let hit = OffTargetHit::new("h", "chr17", 7_673_700, "N", 0, 0.5);
        let point = p.locate(&hit).unwrap();
        let lane = p.lane("chr17").unwrap();
        assert_relative_eq!(point.y, lane.center_y());
        assert_relative_eq!(point.x, 60.0 + 7_673_700.0 / 248_956_422.0 * 710.0, epsilon = 1e-9);

        let stray = OffTargetHit::new("s", "chrM", 10, "N", 0, 0.5);
        assert!(p.locate(&stray).is_none());
        assert_eq!(p.project(&[hit, stray]).len(), 1);
    }

    #[test]
    fn resize_rescales_deterministically() {
        let a = projection(800.0, 600.0);
        let b = projection(1600.0, 600.0);
        let again = projection(800.0, 600.0);
        assert_eq!(a, again);
        let hit = OffTargetHit::new("h", "chr2", 100_000_000, "N", 0, 0.5);
        let xa = a.locate(&hit).unwrap().x - 60.0;
        let xb = b.locate(&hit).unwrap().x - 60.0;
        assert_relative_eq!(xb / xa, 1510.0 / 710.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_panel_collapses_to_margin() {
        let p = projection(10.0, 10.0);
        assert_eq!(p.inner_size(), (0.0, 0.0));
        let hit = OffTargetHit::new("h", "chr1", 1000, "N", 0, 0.5);
        assert_relative_eq!(p.locate(&hit).unwrap().x, 60.0);
    }

    #[test]
    fn axis_ticks_every_fifty_mb() {
        let ticks = projection(800.0, 600.0).axis_ticks();
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, ["0Mb", "50Mb", "100Mb", "150Mb", "200Mb", "250Mb"]);
        assert_relative_eq!(ticks[0].0, 60.0);
    }
}
