use anyhow::{anyhow, Result};
use plotters::prelude::*;

use crate::models::{GenomicContext, OffTargetHit};
use crate::reference::GenomeReference;

#[derive(Debug, Clone, PartialEq)]
pub struct ManhattanPoint {
    /// Genome-wide offset in Mb.
    pub x: f64,
    pub score: f64,
    pub context: GenomicContext,
}

/// Hits on chromosomes outside the reference are left out.
pub fn manhattan_points(reference: &GenomeReference, hits: &[OffTargetHit]) -> Vec<ManhattanPoint> {
    hits.iter()
        .filter_map(|h| {
            reference.genome_offset(&h.chromosome, h.position).map(|offset| ManhattanPoint {
                x: offset as f64 / 1e6,
                score: h.cfd_score,
                context: h.region_type,
            })
        })
        .collect()
}

fn context_rgb(context: GenomicContext) -> RGBColor {
    match context {
        GenomicContext::Exon => RGBColor(0xef, 0x44, 0x44),
        GenomicContext::Promoter => RGBColor(0xf5, 0x9e, 0x0b),
        GenomicContext::Intron => RGBColor(0x3b, 0x82, 0xf6),
        GenomicContext::Intergenic => RGBColor(0x10, 0xb9, 0x81),
        GenomicContext::Unknown => RGBColor(0x64, 0x74, 0x8b),
    }
}

/// Genome-wide score scatter with alternating chromosome shading.
pub fn render_manhattan(
    reference: &GenomeReference,
    hits: &[OffTargetHit],
    size: (u32, u32),
    title: &str,
) -> Result<String> {
    let points = manhattan_points(reference, hits);
    let genome_mb = reference.total_length() as f64 / 1e6;
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..genome_mb.max(1.0), 0.0..1.05)
            .map_err(|e| anyhow!("{}", e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Genome position (Mb)")
            .y_desc("CFD score")
            .draw()
            .map_err(|e| anyhow!("{}", e))?;

        // shade every other chromosome
        let mut start = 0.0;
        for (i, chr) in reference.chromosomes().iter().enumerate() {
            let end = start + chr.length as f64 / 1e6;
            if i % 2 == 1 {
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(start, 0.0), (end, 1.05)],
                        RGBColor(0xf1, 0xf5, 0xf9).filled(),
                    )))
                    .map_err(|e| anyhow!("{}", e))?;
            }
            start = end;
        }

        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.x, p.score), 3, context_rgb(p.context).filled())),
            )
            .map_err(|e| anyhow!("{}", e))?;

        root.present().map_err(|e| anyhow!("{}", e))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn points_use_genome_wide_offsets() {
        let reference = GenomeReference::hg38();
        let hits = vec![
            OffTargetHit::new("a", "chr1", 1_000_000, "N", 0, 0.9),
            OffTargetHit::new("b", "chr2", 0, "N", 1, 0.4).with_context(GenomicContext::Exon),
            OffTargetHit::new("c", "chrUn", 5, "N", 1, 0.4),
            OffTargetHit::new("d", "chrY", u64::MAX, "N", 1, 0.4),
        ];
        let points = manhattan_points(&reference, &hits);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, 1.0);
        assert_relative_eq!(points[1].x, 248.956_422);
        assert_eq!(points[1].context, GenomicContext::Exon);
    }

    #[test]
    fn palette_matches_context_colors() {
        for context in GenomicContext::ALL {
            let RGBColor(r, g, b) = context_rgb(context);
            assert_eq!(format!("#{:02x}{:02x}{:02x}", r, g, b), context.color());
        }
    }
}
