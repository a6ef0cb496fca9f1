//! Spatial mappings from canonical records to panel coordinates.
//!
//! Both strategies are plain values computed from (reference, panel size,
//! layout parameters); building a new one is how a resize is handled.

use serde::Serialize;

use crate::models::OffTargetHit;

pub mod linear;
pub mod polar;

pub use linear::LinearProjection;
pub use polar::{ArcDefinition, PolarProjection};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedHit<'a> {
    pub hit: &'a OffTargetHit,
    pub point: Point,
}

pub trait Projection {
    fn name(&self) -> &'static str;

    fn panel(&self) -> PanelSize;

    /// `None` when the hit's chromosome is not part of the layout.
    fn locate(&self, hit: &OffTargetHit) -> Option<Point>;

    fn project<'a>(&self, hits: &'a [OffTargetHit]) -> Vec<ProjectedHit<'a>> {
        let projected: Vec<ProjectedHit<'a>> = hits
            .iter()
            .filter_map(|hit| self.locate(hit).map(|point| ProjectedHit { hit, point }))
            .collect();
        if projected.len() < hits.len() {
            tracing::debug!(
                "{} projection: {} hit(s) on chromosomes outside the layout",
                self.name(),
                hits.len() - projected.len()
            );
        }
        projected
    }
}

/// One colour per chromosome, cycled in genome order.
pub const CHROMOSOME_COLORS: [&str; 24] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999", "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494",
    "#b3b3b3", "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
];
