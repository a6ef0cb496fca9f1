use svg::node::element::{Circle, Line, Rectangle, Text};
use svg::Document;

use crate::models::OffTargetHit;
use crate::projection::{LinearProjection, Projection};
use crate::render::{marker_radius, BACKGROUND, LABEL_COLOR, SELECTED_COLOR};

const BAR_COLOR: &str = "#1e293b";
const CENTROMERE_COLOR: &str = "#475569";

/// One bar per chromosome with hits placed along it.
pub fn render_ideogram(projection: &LinearProjection, hits: &[OffTargetHit], selected: Option<&str>) -> String {
    let panel = projection.panel();
    let margin = projection.margin();
    let (_, inner_height) = projection.inner_size();

    let mut doc = Document::new()
        .set("viewBox", (0.0, 0.0, panel.width, panel.height))
        .set("width", panel.width)
        .set("height", panel.height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", panel.width)
                .set("height", panel.height)
                .set("fill", BACKGROUND),
        );

    for lane in projection.lanes() {
        doc = doc
            .add(
                Text::new(lane.label.clone())
                    .set("x", margin.left - 10.0)
                    .set("y", lane.center_y())
                    .set("text-anchor", "end")
                    .set("dominant-baseline", "middle")
                    .set("font-family", "sans-serif")
                    .set("font-size", 10)
                    .set("fill", LABEL_COLOR),
            )
            .add(
                Rectangle::new()
                    .set("x", margin.left)
                    .set("y", lane.y)
                    .set("width", lane.bar_width)
                    .set("height", lane.height)
                    .set("rx", lane.height / 2.0)
                    .set("fill", BAR_COLOR),
            );
        if let Some(cx) = lane.centromere_x {
            doc = doc.add(
                Line::new()
                    .set("x1", cx)
                    .set("y1", lane.y)
                    .set("x2", cx)
                    .set("y2", lane.y + lane.height)
                    .set("stroke", CENTROMERE_COLOR)
                    .set("stroke-width", 2),
            );
        }
    }

    let axis_y = margin.top + inner_height + 16.0;
    for (x, label) in projection.axis_ticks() {
        doc = doc.add(
            Text::new(label)
                .set("x", x)
                .set("y", axis_y)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 10)
                .set("fill", LABEL_COLOR),
        );
    }

    for placed in projection.project(hits) {
        let hit = placed.hit;
        let is_selected = selected == Some(hit.id.as_str());
        doc = doc.add(
            Circle::new()
                .set("cx", placed.point.x)
                .set("cy", placed.point.y)
                .set("r", marker_radius(hit.mismatches, is_selected))
                .set("fill", hit.region_type.color())
                .set("fill-opacity", 0.3 + 0.7 * hit.cfd_score)
                .set("stroke", if is_selected { SELECTED_COLOR } else { "none" })
                .set("data-id", hit.id.as_str()),
        );
    }

    doc.to_string()
}
