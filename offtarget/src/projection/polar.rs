use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;
use tracing::debug;

use crate::models::OffTargetHit;
use crate::projection::{PanelSize, Point, Projection, CHROMOSOME_COLORS};
use crate::reference::GenomeReference;

pub const DEFAULT_PADDING: f64 = 0.05;
pub const DEFAULT_TRACK_WIDTH: f64 = 50.0;
/// Hits above this score (with at least one mismatch) get a link to the
/// on-target site when nothing is selected.
pub const LINK_SCORE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcDefinition {
    pub id: String,
    pub name: String,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: String,
    pub length: u64,
}

impl ArcDefinition {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// Angular segments in genome order. Each chromosome gets a share of
/// `2π - padding * n` proportional to its length; the cursor advances by
/// span plus padding, so spans and paddings add up to a full turn.
/// Padding is clamped to `[0, 2π / n]`; the value actually used is returned.
pub fn compute_arcs(reference: &GenomeReference, padding: f64) -> (Vec<ArcDefinition>, f64) {
    let chromosomes = reference.chromosomes();
    let n = chromosomes.len();
    if n == 0 {
        return (Vec::new(), 0.0);
    }
    let padding = if padding.is_finite() { padding.clamp(0.0, TAU / n as f64) } else { 0.0 };
    let available = (TAU - padding * n as f64).max(0.0);
    let total = reference.total_length() as f64;

    let mut cursor = 0.0;
    let arcs = chromosomes
        .iter()
        .enumerate()
        .map(|(i, chr)| {
            let span = if total > 0.0 { chr.length as f64 / total * available } else { 0.0 };
            let arc = ArcDefinition {
                id: chr.id.clone(),
                name: chr.name.clone(),
                start_angle: cursor,
                end_angle: cursor + span,
                color: CHROMOSOME_COLORS[i % CHROMOSOME_COLORS.len()].to_string(),
                length: chr.length,
            };
            cursor += span + padding;
            arc
        })
        .collect();
    debug!("Computed {} arcs with padding {:.4} rad", n, padding);
    (arcs, padding)
}

/// Rotates so that angle 0 sits at 12 o'clock.
pub fn polar_to_cartesian(angle: f64, radius: f64) -> Point {
    Point {
        x: radius * (angle - FRAC_PI_2).cos(),
        y: radius * (angle - FRAC_PI_2).sin(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Radii {
    pub outer: f64,
    pub inner: f64,
    /// Outer edge of the hit track.
    pub track: f64,
}

impl Radii {
    fn for_panel(panel: PanelSize) -> Self {
        let outer = (panel.width.min(panel.height) / 2.0 - 40.0).max(0.0);
        let inner = (outer - 20.0).max(0.0);
        let track = (inner - 40.0).max(0.0);
        Self { outer, inner, track }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarProjection {
    panel: PanelSize,
    padding: f64,
    track_width: f64,
    radii: Radii,
    arcs: Vec<ArcDefinition>,
}

impl PolarProjection {
    pub fn new(reference: &GenomeReference, panel: PanelSize) -> Self {
        Self::with_layout(reference, panel, DEFAULT_PADDING, DEFAULT_TRACK_WIDTH)
    }

    pub fn with_layout(reference: &GenomeReference, panel: PanelSize, padding: f64, track_width: f64) -> Self {
        let (arcs, padding) = compute_arcs(reference, padding);
        Self::from_arcs(arcs, panel, padding, track_width)
    }

    /// Reuses an arc layout computed earlier for the same padding.
    pub fn from_arcs(arcs: Vec<ArcDefinition>, panel: PanelSize, padding: f64, track_width: f64) -> Self {
        Self {
            panel,
            padding,
            track_width: track_width.max(0.0),
            radii: Radii::for_panel(panel),
            arcs,
        }
    }

    pub fn arcs(&self) -> &[ArcDefinition] {
        &self.arcs
    }

    pub fn arc(&self, chromosome: &str) -> Option<&ArcDefinition> {
        self.arcs.iter().find(|a| a.id == chromosome)
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn radii(&self) -> Radii {
        self.radii
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.panel.width / 2.0,
            y: self.panel.height / 2.0,
        }
    }

    pub fn angle(&self, chromosome: &str, position: u64) -> Option<f64> {
        let arc = self.arc(chromosome)?;
        if arc.length == 0 {
            return Some(arc.start_angle);
        }
        Some(arc.start_angle + (position as f64 / arc.length as f64) * arc.span())
    }

    /// Score 0 sits on the inner edge of the hit track, score 1 on its outer
    /// edge.
    pub fn radius(&self, score: f64) -> f64 {
        (self.radii.track - self.track_width) + score * self.track_width
    }

    /// Offset from the plot centre.
    pub fn relative(&self, hit: &OffTargetHit) -> Option<Point> {
        let angle = self.angle(&hit.chromosome, hit.position)?;
        Some(polar_to_cartesian(angle, self.radius(hit.cfd_score)))
    }

    /// (angle, radius) of the anchor the connection links start from.
    pub fn anchor(&self, on_target: &OffTargetHit) -> Option<(f64, f64)> {
        let angle = self.angle(&on_target.chromosome, on_target.position)?;
        Some((angle, self.radii.track - 60.0))
    }

    /// The selected hit alone if there is one, otherwise every risky
    /// off-target hit.
    pub fn connections<'a>(&self, hits: &'a [OffTargetHit], selected: Option<&str>) -> Vec<&'a OffTargetHit> {
        let placed = hits.iter().filter(|h| self.arc(&h.chromosome).is_some());
        match selected {
            Some(id) => placed.filter(|h| h.id == id).take(1).collect(),
            None => placed
                .filter(|h| h.cfd_score > LINK_SCORE_THRESHOLD && h.mismatches > 0)
                .collect(),
        }
    }
}

impl Projection for PolarProjection {
    fn name(&self) -> &'static str {
        "polar"
    }

    fn panel(&self) -> PanelSize {
        self.panel
    }

    fn locate(&self, hit: &OffTargetHit) -> Option<Point> {
        let offset = self.relative(hit)?;
        let center = self.center();
        Some(Point {
            x: center.x + offset.x,
            y: center.y + offset.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> GenomeReference {
        GenomeReference::hg38()
    }

    #[test]
    fn spans_plus_padding_make_a_full_turn() {
        for padding in [0.0, 0.01, 0.05, 0.2] {
            for (w, h) in [(200.0, 200.0), (800.0, 600.0), (1920.0, 1080.0)] {
                let p = PolarProjection::with_layout(&reference(), PanelSize::new(w, h), padding, 50.0);
                let spans: f64 = p.arcs().iter().map(|a| a.span()).sum();
                let total = spans + p.padding() * p.arcs().len() as f64;
                assert_relative_eq!(total, TAU, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn arcs_are_contiguous_and_proportional() {
        let (arcs, padding) = compute_arcs(&reference(), DEFAULT_PADDING);
        assert_eq!(arcs[0].start_angle, 0.0);
        for w in arcs.windows(2) {
            assert_relative_eq!(w[1].start_angle, w[0].end_angle + padding, epsilon = 1e-12);
        }
        let ratio = arcs[0].span() / arcs[20].span();
        assert_relative_eq!(ratio, 248_956_422.0 / 46_709_983.0, epsilon = 1e-9);
        assert_eq!(arcs[0].color, "#e41a1c");
        assert_eq!(arcs[23].id, "chrY");
    }

    #[test]
    fn oversized_padding_is_clamped() {
        let (arcs, padding) = compute_arcs(&reference(), 1.0);
        assert_relative_eq!(padding, TAU / 24.0);
        assert!(arcs.iter().all(|a| a.span() == 0.0));
        let (_, padding) = compute_arcs(&reference(), -0.3);
        assert_eq!(padding, 0.0);
    }

    #[test]
    fn hit_angle_interpolates_within_arc() {
        let p = PolarProjection::new(&reference(), PanelSize::new(800.0, 800.0));
        let arc = p.arc("chr3").unwrap().clone();
        let mid = p.angle("chr3", arc.length / 2).unwrap();
        assert_relative_eq!(mid, (arc.start_angle + arc.end_angle) / 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.angle("chr3", 0).unwrap(), arc.start_angle);
        assert!(p.angle("chrM", 10).is_none());
    }

    #[test]
    fn radius_encodes_score_within_track() {
        let p = PolarProjection::new(&reference(), PanelSize::new(800.0, 600.0));
        let radii = p.radii();
        assert_relative_eq!(radii.outer, 260.0);
        assert_relative_eq!(radii.inner, 240.0);
        assert_relative_eq!(radii.track, 200.0);
        assert_relative_eq!(p.radius(0.0), 150.0);
        assert_relative_eq!(p.radius(1.0), 200.0);
        assert_relative_eq!(p.radius(0.5), 175.0);
    }

    #[test]
    fn zero_angle_points_up() {
        let top = polar_to_cartesian(0.0, 10.0);
        assert_relative_eq!(top.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(top.y, -10.0);
        let right = polar_to_cartesian(FRAC_PI_2, 10.0);
        assert_relative_eq!(right.x, 10.0);
        assert_relative_eq!(right.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn located_point_is_offset_from_center() {
        let p = PolarProjection::new(&reference(), PanelSize::new(800.0, 600.0));
        let hit = OffTargetHit::new("h", "chr1", 0, "N", 0, 1.0);
        let point = p.locate(&hit).unwrap();
        assert_relative_eq!(point.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(point.y, 300.0 - 200.0, epsilon = 1e-9);
    }

    #[test]
    fn connections_follow_selection_or_risk() {
        let p = PolarProjection::new(&reference(), PanelSize::default());
        let hits = vec![
            OffTargetHit::new("self", "chr17", 7_673_700, "N", 0, 1.0),
            OffTargetHit::new("risky", "chr4", 15_324_500, "N", 1, 0.85),
            OffTargetHit::new("low", "chr1", 11_200_300, "N", 2, 0.38),
        ];
        let ids: Vec<&str> = p.connections(&hits, None).iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["risky"]);
        let ids: Vec<&str> = p.connections(&hits, Some("low")).iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["low"]);
        assert!(p.connections(&hits, Some("missing")).is_empty());

        let (_, radius) = p.anchor(&hits[0]).unwrap();
        assert_relative_eq!(radius, p.radii().track - 60.0);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let a = PolarProjection::new(&reference(), PanelSize::new(640.0, 480.0));
        let b = PolarProjection::new(&reference(), PanelSize::new(640.0, 480.0));
        assert_eq!(a, b);
    }
}
