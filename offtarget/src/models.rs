use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.trim() {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Genomic context of a hit. `Unknown` until classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenomicContext {
    Exon,
    Intron,
    Intergenic,
    Promoter,
    #[default]
    Unknown,
}

impl GenomicContext {
    pub const ALL: [GenomicContext; 5] = [
        GenomicContext::Exon,
        GenomicContext::Intron,
        GenomicContext::Intergenic,
        GenomicContext::Promoter,
        GenomicContext::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenomicContext::Exon => "Exon",
            GenomicContext::Intron => "Intron",
            GenomicContext::Intergenic => "Intergenic",
            GenomicContext::Promoter => "Promoter",
            GenomicContext::Unknown => "Unknown",
        }
    }

    /// Display colour keyed on risk of the context.
    pub fn color(&self) -> &'static str {
        match self {
            GenomicContext::Exon => "#ef4444",
            GenomicContext::Promoter => "#f59e0b",
            GenomicContext::Intron => "#3b82f6",
            GenomicContext::Intergenic => "#10b981",
            GenomicContext::Unknown => "#64748b",
        }
    }
}

impl fmt::Display for GenomicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GenomicContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenomicContext::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown genomic context '{}'", s))
    }
}

/// Canonical off-target record. Never mutated in place: the `with_*`
/// builders consume the record and return an updated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffTargetHit {
    pub id: String,
    pub chromosome: String,
    /// 1-based genomic position.
    pub position: u64,
    pub sequence: String,
    pub mismatches: u32,
    /// CFD-like score, always within [0, 1].
    pub cfd_score: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gene_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub strand: Option<Strand>,
    #[serde(default)]
    pub region_type: GenomicContext,
}

impl OffTargetHit {
    pub fn new(
        id: impl Into<String>,
        chromosome: impl Into<String>,
        position: u64,
        sequence: impl Into<String>,
        mismatches: u32,
        cfd_score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            chromosome: chromosome.into(),
            position,
            sequence: sequence.into(),
            mismatches,
            cfd_score: clamp_score(cfd_score),
            gene_name: None,
            strand: None,
            region_type: GenomicContext::Unknown,
        }
    }

    pub fn with_gene(mut self, gene_name: Option<String>) -> Self {
        self.gene_name = gene_name.filter(|g| !g.trim().is_empty());
        self
    }

    pub fn with_strand(mut self, strand: Option<Strand>) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_context(mut self, context: GenomicContext) -> Self {
        self.region_type = context;
        self
    }

    pub fn with_score(mut self, cfd_score: f64) -> Self {
        self.cfd_score = clamp_score(cfd_score);
        self
    }
}

/// Clamp into [0, 1]; non-finite input becomes 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromosomeEntry {
    /// Canonical `chrN` form.
    pub id: String,
    pub name: String,
    pub length: u64,
    #[serde(default)]
    pub centromere_position: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exon {
    pub start: u64,
    pub end: u64,
    pub exon_number: u32,
}

impl Exon {
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }
}

/// Gene interval with exon sub-intervals. Coordinates are 1-based and
/// inclusive. Exons are kept in physical order; on `-` strand genes the
/// exon numbers therefore run backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneAnnotation {
    pub gene_id: String,
    pub gene_name: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub exons: Vec<Exon>,
    #[serde(default)]
    pub description: Option<String>,
}

impl GeneAnnotation {
    pub fn new(
        gene_id: &str,
        gene_name: &str,
        chromosome: &str,
        (start, end): (u64, u64),
        strand: Strand,
        mut exons: Vec<Exon>,
    ) -> Self {
        exons.sort_by_key(|e| e.start);
        Self {
            gene_id: gene_id.to_string(),
            gene_name: gene_name.to_string(),
            chromosome: chromosome.to_string(),
            start,
            end,
            strand,
            exons,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Restore physical exon order, e.g. after deserialising a custom table.
    pub fn sort_exons(&mut self) {
        self.exons.sort_by_key(|e| e.start);
    }

    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }

    /// Strand-aware upstream window: `[start - w, start)` on `+`,
    /// `(end, end + w]` on `-`.
    pub fn in_promoter(&self, position: u64, window: u64) -> bool {
        match self.strand {
            Strand::Plus => position >= self.start.saturating_sub(window) && position < self.start,
            Strand::Minus => position > self.end && position <= self.end.saturating_add(window),
        }
    }

    pub fn distance_to(&self, position: u64) -> u64 {
        if position < self.start {
            self.start - position
        } else if position > self.end {
            position - self.end
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped_on_construction() {
        let hit = OffTargetHit::new("a", "chr1", 10, "ACGT", 0, 1.7);
        assert_eq!(hit.cfd_score, 1.0);
        let hit = hit.with_score(-0.2);
        assert_eq!(hit.cfd_score, 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn context_parses_case_insensitively() {
        assert_eq!("exon".parse::<GenomicContext>().unwrap(), GenomicContext::Exon);
        assert_eq!("PROMOTER".parse::<GenomicContext>().unwrap(), GenomicContext::Promoter);
        assert!("utr".parse::<GenomicContext>().is_err());
    }

    #[test]
    fn exons_kept_in_physical_order() {
        let gene = GeneAnnotation::new(
            "G1",
            "G",
            "chr1",
            (100, 900),
            Strand::Minus,
            vec![
                Exon { start: 800, end: 900, exon_number: 1 },
                Exon { start: 100, end: 200, exon_number: 2 },
            ],
        );
        assert_eq!(gene.exons[0].exon_number, 2);
        assert_eq!(gene.exons[1].exon_number, 1);
    }

    #[test]
    fn promoter_window_is_strand_aware() {
        let plus = GeneAnnotation::new("P", "P", "chr1", (5000, 6000), Strand::Plus, vec![]);
        assert!(plus.in_promoter(3000, 2000));
        assert!(!plus.in_promoter(5000, 2000));
        assert!(!plus.in_promoter(6500, 2000));

        let minus = GeneAnnotation::new("M", "M", "chr1", (5000, 6000), Strand::Minus, vec![]);
        assert!(minus.in_promoter(8000, 2000));
        assert!(!minus.in_promoter(6000, 2000));
        assert!(!minus.in_promoter(4000, 2000));
    }

    #[test]
    fn hit_serialises_with_camel_case_fields() {
        let hit = OffTargetHit::new("ot-1", "chr17", 7673700, "ACGT", 0, 1.0)
            .with_gene(Some("TP53".into()))
            .with_context(GenomicContext::Exon);
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["cfdScore"], 1.0);
        assert_eq!(json["geneName"], "TP53");
        assert_eq!(json["regionType"], "Exon");
        assert!(json.get("strand").is_none());
    }
}
