use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

use crate::models::{GenomicContext, OffTargetHit};

pub const HIGH_SCORE: f64 = 0.8;
pub const MEDIUM_SCORE: f64 = 0.4;
const EXON_HIGH_SCORE: f64 = 0.5;

pub const ESSENTIAL_GENES: [&str; 8] = ["GAPDH", "ACTB", "RPS18", "RPL13A", "HPRT1", "POLR2A", "TBP", "UBC"];

pub const CANCER_GENES: [&str; 25] = [
    "TP53", "BRCA1", "BRCA2", "EGFR", "KRAS", "MYC", "PTEN", "PIK3CA", "BRAF", "APC", "RB1", "VHL", "CDKN2A",
    "FLT3", "IDH1", "JAK2", "KIT", "MET", "NOTCH1", "NPM1", "NRAS", "SMAD4", "SMARCA4", "STK11", "WT1",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High: score above 0.8, or an exon hit above 0.5. Medium: score above
    /// 0.4 or any promoter hit. Everything else is low.
    pub fn assess(hit: &OffTargetHit) -> RiskLevel {
        let exon = hit.region_type == GenomicContext::Exon;
        if hit.cfd_score > HIGH_SCORE || (exon && hit.cfd_score > EXON_HIGH_SCORE) {
            RiskLevel::High
        } else if hit.cfd_score > MEDIUM_SCORE || hit.region_type == GenomicContext::Promoter {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_essential_gene(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ESSENTIAL_GENES.contains(&upper.as_str())
}

pub fn is_cancer_gene(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    CANCER_GENES.contains(&upper.as_str())
}

pub fn gene_risk(name: &str) -> RiskLevel {
    if is_cancer_gene(name) || is_essential_gene(name) {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0 for a single score.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStats {
    pub fn from_hits(hits: &[OffTargetHit]) -> Option<ScoreStats> {
        if hits.is_empty() {
            return None;
        }
        let scores: Vec<f64> = hits.iter().map(|h| h.cfd_score).collect();
        let std_dev = if scores.len() > 1 { Statistics::std_dev(&scores) } else { 0.0 };
        Some(ScoreStats {
            mean: Statistics::mean(&scores),
            median: Data::new(scores.clone()).median(),
            std_dev,
            min: Statistics::min(&scores),
            max: Statistics::max(&scores),
        })
    }
}

/// Headline counts for a hit set. The high and medium buckets follow the
/// dashboard definition and can overlap: an exon hit at 0.6 counts in both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub chromosomes: usize,
    pub on_target: Option<OffTargetHit>,
    /// Hits landing in a cancer or essential gene.
    pub critical_genes: Vec<String>,
    pub scores: Option<ScoreStats>,
}

impl RiskSummary {
    pub fn from_hits(hits: &[OffTargetHit]) -> RiskSummary {
        let high = hits
            .iter()
            .filter(|h| h.cfd_score > HIGH_SCORE || h.region_type == GenomicContext::Exon)
            .count();
        let medium = hits
            .iter()
            .filter(|h| h.cfd_score > MEDIUM_SCORE && h.cfd_score <= HIGH_SCORE)
            .count();
        let low = hits.iter().filter(|h| h.cfd_score <= MEDIUM_SCORE).count();
        let chromosomes = hits.iter().map(|h| h.chromosome.as_str()).collect::<BTreeSet<_>>().len();
        let critical_genes = hits
            .iter()
            .filter_map(|h| h.gene_name.as_deref())
            .filter(|g| gene_risk(g) == RiskLevel::High)
            .map(str::to_ascii_uppercase)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        RiskSummary {
            total: hits.len(),
            high,
            medium,
            low,
            chromosomes,
            on_target: hits.iter().find(|h| h.mismatches == 0).cloned(),
            critical_genes,
            scores: ScoreStats::from_hits(hits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::samples::sample_hits;
    use approx::assert_relative_eq;

    fn hit(score: f64, context: GenomicContext) -> OffTargetHit {
        OffTargetHit::new("h", "chr1", 1, "N", 1, score).with_context(context)
    }

    #[test]
    fn per_hit_levels() {
        assert_eq!(RiskLevel::assess(&hit(0.85, GenomicContext::Intergenic)), RiskLevel::High);
        assert_eq!(RiskLevel::assess(&hit(0.55, GenomicContext::Exon)), RiskLevel::High);
        assert_eq!(RiskLevel::assess(&hit(0.45, GenomicContext::Exon)), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess(&hit(0.10, GenomicContext::Promoter)), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess(&hit(0.40, GenomicContext::Intron)), RiskLevel::Low);
        assert!(RiskLevel::High > RiskLevel::Low);
    }

    #[test]
    fn gene_sets_are_case_insensitive() {
        assert!(is_cancer_gene("kras"));
        assert!(is_essential_gene("Gapdh"));
        assert_eq!(gene_risk("EMX1"), RiskLevel::Low);
    }

    #[test]
    fn summary_over_sample_set() {
        let summary = RiskSummary::from_hits(&sample_hits());
        assert_eq!(summary.total, 10);
        // sim-1, sim-2, sim-10 by score; sim-5, sim-8 by exon
        assert_eq!(summary.high, 5);
        assert_eq!(summary.medium, 4);
        assert_eq!(summary.low, 3);
        assert_eq!(summary.chromosomes, 9);
        assert_eq!(summary.on_target.unwrap().id, "sim-1");
        assert_eq!(summary.critical_genes, ["KRAS"]);
    }

    #[test]
    fn score_statistics() {
        let hits: Vec<OffTargetHit> = [0.2, 0.4, 0.9].iter().map(|&s| hit(s, GenomicContext::Intron)).collect();
        let stats = ScoreStats::from_hits(&hits).unwrap();
        assert_relative_eq!(stats.mean, 0.5, epsilon = 1e-12);
        assert_relative_eq!(stats.median, 0.4, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, 0.360_555_127_546_398_9, epsilon = 1e-9);
        assert_relative_eq!(stats.min, 0.2);
        assert_relative_eq!(stats.max, 0.9);

        let single = ScoreStats::from_hits(&hits[..1]).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert!(ScoreStats::from_hits(&[]).is_none());
    }

    #[test]
    fn empty_summary() {
        let summary = RiskSummary::from_hits(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.on_target.is_none());
        assert!(summary.scores.is_none());
    }
}
