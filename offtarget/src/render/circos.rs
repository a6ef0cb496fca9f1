use std::f64::consts::PI;

use svg::node::element::{Circle, Group, Path, Rectangle, Text};
use svg::Document;

use crate::models::OffTargetHit;
use crate::projection::polar::polar_to_cartesian;
use crate::projection::{PolarProjection, Projection};
use crate::render::{marker_radius, BACKGROUND, LABEL_COLOR, SELECTED_COLOR};

fn ring_segment(start: f64, end: f64, inner: f64, outer: f64) -> Option<String> {
    if end <= start || outer <= inner {
        return None;
    }
    let large_arc = if end - start > PI { 1 } else { 0 };
    let p0 = polar_to_cartesian(start, outer);
    let p1 = polar_to_cartesian(end, outer);
    let p2 = polar_to_cartesian(end, inner);
    let p3 = polar_to_cartesian(start, inner);
    Some(format!(
        "M {:.3} {:.3} A {o:.3} {o:.3} 0 {large_arc} 1 {:.3} {:.3} L {:.3} {:.3} A {i:.3} {i:.3} 0 {large_arc} 0 {:.3} {:.3} Z",
        p0.x,
        p0.y,
        p1.x,
        p1.y,
        p2.x,
        p2.y,
        p3.x,
        p3.y,
        o = outer,
        i = inner,
    ))
}

/// Whole-genome circular plot. The first zero-mismatch hit is treated as
/// the on-target site and anchors the connection curves.
pub fn render_circos(projection: &PolarProjection, hits: &[OffTargetHit], selected: Option<&str>) -> String {
    let panel = projection.panel();
    let center = projection.center();
    let radii = projection.radii();

    let mut plot = Group::new().set("transform", format!("translate({:.3},{:.3})", center.x, center.y));

    // 1) chromosome ring and labels
    for arc in projection.arcs() {
        if let Some(d) = ring_segment(arc.start_angle, arc.end_angle, radii.inner, radii.outer) {
            plot = plot.add(
                Path::new()
                    .set("d", d)
                    .set("fill", arc.color.as_str())
                    .set("fill-opacity", 0.85),
            );
        }
        let mid = (arc.start_angle + arc.end_angle) / 2.0;
        let label = polar_to_cartesian(mid, radii.outer + 14.0);
        plot = plot.add(
            Text::new(arc.name.clone())
                .set("x", label.x)
                .set("y", label.y)
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 10)
                .set("fill", LABEL_COLOR),
        );
    }

    // 2) hit track guides at score 0 and 1
    for r in [projection.radius(0.0), projection.radius(1.0)] {
        plot = plot.add(
            Circle::new()
                .set("cx", 0)
                .set("cy", 0)
                .set("r", r.max(0.0))
                .set("fill", "none")
                .set("stroke", "#334155")
                .set("stroke-dasharray", "2,4"),
        );
    }

    // 3) connections from the on-target anchor
    let on_target = hits.iter().find(|h| h.mismatches == 0);
    if let Some((angle, radius)) = on_target.and_then(|h| projection.anchor(h)) {
        let anchor = polar_to_cartesian(angle, radius);
        for hit in projection.connections(hits, selected) {
            if on_target.is_some_and(|t| t.id == hit.id) {
                continue;
            }
            if let Some(end) = projection.relative(hit) {
                let is_selected = selected == Some(hit.id.as_str());
                plot = plot.add(
                    Path::new()
                        .set(
                            "d",
                            format!("M {:.3} {:.3} Q 0 0 {:.3} {:.3}", anchor.x, anchor.y, end.x, end.y),
                        )
                        .set("fill", "none")
                        .set("stroke", if is_selected { SELECTED_COLOR } else { hit.region_type.color() })
                        .set("stroke-opacity", 0.6)
                        .set("stroke-width", if is_selected { 2 } else { 1 }),
                );
            }
        }
    }

    // 4) hits
    for hit in hits {
        let Some(p) = projection.relative(hit) else { continue };
        let is_selected = selected == Some(hit.id.as_str());
        plot = plot.add(
            Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", marker_radius(hit.mismatches, is_selected))
                .set("fill", hit.region_type.color())
                .set("stroke", if is_selected { SELECTED_COLOR } else { "none" })
                .set("data-id", hit.id.as_str()),
        );
    }

    let doc = Document::new()
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
        )
        .add(plot);
    doc.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::samples::mock_analysis;
    use crate::projection::PanelSize;
    use crate::reference::GenomeReference;

    #[test]
    fn renders_every_chromosome_and_placed_hit() {
        let projection = PolarProjection::new(&GenomeReference::hg38(), PanelSize::new(700.0, 700.0));
        let mut hits = mock_analysis(3);
        hits.push(OffTargetHit::new("mito", "chrM", 100, "N", 2, 0.1));
        let svg = render_circos(&projection, &hits, None);
        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<path").count() - svg.matches(" Q 0 0 ").count(), 24);
        assert_eq!(svg.matches("data-id=").count(), hits.len() - 1);
        assert!(!svg.contains("data-id=\"mito\""));
    }

    #[test]
    fn selection_limits_connections() {
        let projection = PolarProjection::new(&GenomeReference::hg38(), PanelSize::default());
        let hits = mock_analysis(3);
        let all = render_circos(&projection, &hits, None);
        let one = render_circos(&projection, &hits, Some("ot-004"));
        assert_eq!(all.matches(" Q 0 0 ").count(), projection.connections(&hits, None).len());
        assert_eq!(one.matches(" Q 0 0 ").count(), 1);
        assert!(one.contains(SELECTED_COLOR));
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        assert!(ring_segment(1.0, 1.0, 10.0, 20.0).is_none());
        assert!(ring_segment(0.0, 1.0, 20.0, 20.0).is_none());
        assert!(ring_segment(0.0, 4.0, 10.0, 20.0).unwrap().contains(" 0 1 1 "));
    }
}
