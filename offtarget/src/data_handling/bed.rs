use tracing::debug;

use crate::data_handling::column_mapper::normalize_chromosome;
use crate::data_handling::{parse_position, ParseReport};
use crate::guide::GUIDE_LENGTH;
use crate::models::{OffTargetHit, Strand};

fn is_header_line(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// BED scores run 0-1000 by convention.
fn normalize_bed_score(raw: Option<&str>) -> f64 {
    match raw.and_then(|s| s.parse::<f64>().ok()) {
        Some(s) if s.is_finite() && s > 1.0 => s / 1000.0,
        Some(s) if s.is_finite() => s,
        _ => 0.0,
    }
}

/// Positional 6-column BED: chrom, chromStart, chromEnd, name, score, strand.
/// Lines with fewer than three fields, or an unusable start, are dropped
/// without an error entry. The start coordinate is kept as the position.
pub fn parse_bed(content: &str, guide: Option<&str>) -> ParseReport {
    let mut report = ParseReport::default();
    let sequence = guide
        .map(str::to_uppercase)
        .unwrap_or_else(|| "N".repeat(GUIDE_LENGTH));

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if is_header_line(line) {
            continue;
        }
        report.total_rows += 1;

        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            debug!("Skipping BED line {}: {} field(s)", index + 1, cols.len());
            continue;
        }
        let position = match parse_position(cols[1]) {
            Ok(p) => p,
            Err(reason) => {
                debug!("Skipping BED line {}: start '{}': {}", index + 1, cols[1], reason);
                continue;
            }
        };

        let name = cols.get(3).filter(|n| **n != ".").map(|n| n.to_string());
        let hit = OffTargetHit::new(
            format!("bed-{}", index),
            normalize_chromosome(cols[0]),
            position,
            sequence.clone(),
            0,
            normalize_bed_score(cols.get(4).copied()),
        )
        .with_gene(name)
        .with_strand(cols.get(5).and_then(|s| Strand::from_symbol(s)));

        report.hits.push(hit);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenomicContext;
    use approx::assert_relative_eq;

    #[test]
    fn scenario_single_bed_line() {
        let report = parse_bed("chr1 100 123 siteA 500 -", None);
        assert_eq!(report.hits.len(), 1);
        let hit = &report.hits[0];
        assert_eq!(hit.position, 100);
        assert_relative_eq!(hit.cfd_score, 0.5);
        assert_eq!(hit.strand, Some(Strand::Minus));
        assert_eq!(hit.mismatches, 0);
        assert_eq!(hit.region_type, GenomicContext::Unknown);
        assert_eq!(hit.gene_name.as_deref(), Some("siteA"));
    }

    #[test]
    fn headers_comments_and_short_lines_are_silent() {
        let input = "browser position chr1:1-1000\ntrack name=hits\n# comment\n\nchr2 5\nchr3\t10\t33\t.\t0.7\t+\n";
        let report = parse_bed(input, Some("acgt"));
        assert!(report.errors.is_empty());
        assert_eq!(report.hits.len(), 1);
        let hit = &report.hits[0];
        assert_eq!(hit.id, "bed-5");
        assert_eq!(hit.gene_name, None);
        assert_relative_eq!(hit.cfd_score, 0.7);
        assert_eq!(hit.sequence, "ACGT");
    }

    #[test]
    fn integral_float_start_is_accepted() {
        let report = parse_bed("chr1\t100.0\t123\nchr2\t1e300\t5\nchr3\t7.5\t9\n", None);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].position, 100);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn three_column_bed_yields_bare_hit() {
        let report = parse_bed("7\t99887700\t99887723\n", None);
        let hit = &report.hits[0];
        assert_eq!(hit.chromosome, "chr7");
        assert_eq!(hit.gene_name, None);
        assert_eq!(hit.strand, None);
        assert_eq!(hit.cfd_score, 0.0);
    }
}
