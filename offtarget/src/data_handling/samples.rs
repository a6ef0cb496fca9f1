use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{GenomicContext, OffTargetHit, Strand};
use crate::reference::GenomeReference;

const TP53_GUIDE: &str = "CCATTGTTCAATATCGTCCG";
const MOCK_CLOUD_SIZE: usize = 150;

// id, chrom, pos, seq, mm, score, gene, context, strand
type SampleRow = (&'static str, &'static str, u64, &'static str, u32, f64, Option<&'static str>, GenomicContext, Option<Strand>);

fn build(rows: &[SampleRow]) -> Vec<OffTargetHit> {
    rows.iter()
        .map(|&(id, chrom, pos, seq, mm, score, gene, context, strand)| {
            OffTargetHit::new(id, chrom, pos, seq, mm, score)
                .with_gene(gene.map(str::to_string))
                .with_context(context)
                .with_strand(strand)
        })
        .collect()
}

/// Fixed ten-hit set for an EMX1 guide.
pub fn sample_hits() -> Vec<OffTargetHit> {
    use GenomicContext::*;
    use Strand::*;
    build(&[
        ("sim-1", "chr1", 12_054_300, "GTCACCTCCAATGACTAGGG", 0, 1.0, Some("EMX1"), Exon, Some(Plus)),
        ("sim-2", "chr5", 45_229_100, "GTCACCTCCAATGACTAGGA", 1, 0.85, Some("Unknown"), Intergenic, Some(Minus)),
        ("sim-3", "chr8", 89_102_200, "GTCACCTTCAATGACTAGGG", 1, 0.62, Some("GATA4"), Intron, Some(Plus)),
        ("sim-4", "chrX", 15_300_100, "GTCACCTCCAATGACTAAGG", 2, 0.23, Some("F8"), Promoter, Some(Plus)),
        ("sim-5", "chr12", 6_610_020, "GTCAGCTCCAATGACTAGGG", 1, 0.55, Some("KRAS"), Exon, Some(Minus)),
        ("sim-6", "chr2", 11_200_300, "GTCACCTCCAATCACTAGGG", 1, 0.45, None, Intron, Some(Plus)),
        ("sim-7", "chr15", 22_334_400, "GTCACCTCCAATGACTATGG", 1, 0.41, Some("Unknown"), Intergenic, Some(Minus)),
        ("sim-8", "chr7", 99_887_700, "GTCACCTCCAATGACTAGTT", 2, 0.12, Some("CFTR"), Exon, Some(Plus)),
        ("sim-9", "chr11", 33_221_100, "GTCACCTCCAATGACTAGCG", 2, 0.08, Some("HBB"), Promoter, Some(Minus)),
        ("sim-10", "chr1", 12_054_350, "GTCACCTCCAATGACTAGGG", 0, 0.99, Some("EMX1-isoform"), Exon, Some(Plus)),
    ])
}

fn anchor_hits() -> Vec<OffTargetHit> {
    use GenomicContext::*;
    build(&[
        ("ot-001", "chr17", 7_673_700, "CCATTGTTCAATATCGTCCG", 0, 1.0, Some("TP53"), Exon, None),
        ("ot-002", "chr4", 15_324_500, "CCATTGTTCAATATCGTCCT", 1, 0.85, Some("Unknown"), Intron, None),
        ("ot-003", "chr9", 34_521_000, "CCATTGTTCAATATCGTCCA", 1, 0.72, Some("CDKN2A"), Promoter, None),
        ("ot-004", "chr12", 56_100_200, "CCATTGTTCAATATCGTCGG", 2, 0.45, Some("KRAS"), Intergenic, None),
        ("ot-005", "chr1", 11_200_300, "CCATTGTTCAATATCGTCCC", 2, 0.38, None, Intron, None),
    ])
}

/// Stand-in for a genome-wide search: five anchor hits with scores jittered
/// by up to ±0.05, plus a cloud of low-risk hits. Same seed, same output.
pub fn mock_analysis(seed: u64) -> Vec<OffTargetHit> {
    let mut rng = StdRng::seed_from_u64(seed);
    let reference = GenomeReference::hg38();
    let chromosomes = reference.chromosomes();
    let contexts = [
        GenomicContext::Intron,
        GenomicContext::Exon,
        GenomicContext::Intergenic,
        GenomicContext::Promoter,
    ];

    let mut hits: Vec<OffTargetHit> = anchor_hits()
        .into_iter()
        .map(|h| {
            let jitter = rng.gen_range(-0.05f64..0.05);
            let score = h.cfd_score + jitter;
            h.with_score(score)
        })
        .collect();

    for i in 0..MOCK_CLOUD_SIZE {
        let chrom = &chromosomes[rng.gen_range(0..chromosomes.len())];
        let position = rng.gen_range(0..chrom.length.min(150_000_000));
        let gene = if rng.gen_bool(0.2) { Some(format!("Gene-{}", i)) } else { None };
        let hit = OffTargetHit::new(
            format!("ot-rand-{}", i),
            chrom.id.clone(),
            position,
            TP53_GUIDE,
            rng.gen_range(2..=4),
            rng.gen::<f64>() * 0.2,
        )
        .with_gene(gene)
        .with_context(contexts[rng.gen_range(0..contexts.len())]);
        hits.push(hit);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_is_fixed() {
        let hits = sample_hits();
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0].id, "sim-1");
        assert!(hits.iter().all(|h| h.strand.is_some()));
    }

    #[test]
    fn mock_analysis_is_seeded_and_bounded() {
        let a = mock_analysis(42);
        let b = mock_analysis(42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5 + MOCK_CLOUD_SIZE);
        assert!(a.iter().all(|h| (0.0..=1.0).contains(&h.cfd_score)));
        assert!(a[5..].iter().all(|h| h.cfd_score < 0.2 && (2..=4).contains(&h.mismatches)));
        assert!((a[1].cfd_score - 0.85).abs() <= 0.05 + 1e-12);
        let reference = GenomeReference::hg38();
        assert!(a.iter().all(|h| h.position < reference.chromosome(&h.chromosome).unwrap().length));
    }
}
