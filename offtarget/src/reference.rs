//! Static hg38 chromosome catalogue and a small gene annotation table.
//!
//! The gene table stands in for a genome database and only covers a handful
//! of well known loci.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::data_handling::column_mapper::normalize_chromosome;
use crate::error::Result;
use crate::models::{ChromosomeEntry, Exon, GeneAnnotation, Strand};

// (id, name, length, centromere)
const HG38_CHROMOSOMES: [(&str, &str, u64, u64); 24] = [
    ("chr1", "1", 248_956_422, 122_026_459),
    ("chr2", "2", 242_193_529, 92_188_145),
    ("chr3", "3", 198_295_559, 90_772_458),
    ("chr4", "4", 190_214_555, 49_660_117),
    ("chr5", "5", 181_538_259, 46_405_641),
    ("chr6", "6", 170_805_979, 58_830_166),
    ("chr7", "7", 159_345_973, 58_054_331),
    ("chr8", "8", 145_138_636, 43_838_887),
    ("chr9", "9", 138_394_717, 47_367_679),
    ("chr10", "10", 133_797_422, 39_254_935),
    ("chr11", "11", 135_086_622, 51_644_205),
    ("chr12", "12", 133_275_309, 34_856_694),
    ("chr13", "13", 114_364_328, 16_000_000),
    ("chr14", "14", 107_043_718, 16_000_000),
    ("chr15", "15", 101_991_189, 17_000_000),
    ("chr16", "16", 90_338_345, 35_335_801),
    ("chr17", "17", 83_257_441, 22_263_006),
    ("chr18", "18", 80_373_285, 15_460_898),
    ("chr19", "19", 58_617_616, 24_681_742),
    ("chr20", "20", 64_444_167, 26_369_569),
    ("chr21", "21", 46_709_983, 11_288_129),
    ("chr22", "22", 50_818_468, 13_000_000),
    ("chrX", "X", 156_040_895, 58_632_012),
    ("chrY", "Y", 57_227_415, 10_104_553),
];

/// Chromosome order and gene intervals shared by the classifier and both
/// projections. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenomeReference {
    chromosomes: Vec<ChromosomeEntry>,
    genes: Vec<GeneAnnotation>,
}

impl Default for GenomeReference {
    fn default() -> Self {
        Self::hg38()
    }
}

impl GenomeReference {
    pub fn new(chromosomes: Vec<ChromosomeEntry>, genes: Vec<GeneAnnotation>) -> Self {
        Self { chromosomes, genes }
    }

    pub fn hg38() -> Self {
        let chromosomes = HG38_CHROMOSOMES
            .iter()
            .map(|&(id, name, length, centromere)| ChromosomeEntry {
                id: id.to_string(),
                name: name.to_string(),
                length,
                centromere_position: Some(centromere),
            })
            .collect();
        Self::new(chromosomes, builtin_genes())
    }

    /// Same chromosomes, different gene table.
    /// Chromosome names are normalised to the `chrN` form used by hits.
    pub fn with_genes(mut self, mut genes: Vec<GeneAnnotation>) -> Self {
        for gene in genes.iter_mut() {
            gene.chromosome = normalize_chromosome(&gene.chromosome);
            gene.sort_exons();
        }
        self.genes = genes;
        self
    }

    /// Loads a JSON list of gene annotations to replace the built-in table.
    pub fn with_gene_table(self, path: &Path) -> Result<Self> {
        info!("Reading gene table from: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let genes: Vec<GeneAnnotation> = serde_json::from_reader(reader)?;
        info!("Loaded {} gene annotations", genes.len());
        Ok(self.with_genes(genes))
    }

    pub fn chromosomes(&self) -> &[ChromosomeEntry] {
        &self.chromosomes
    }

    pub fn genes(&self) -> &[GeneAnnotation] {
        &self.genes
    }

    pub fn chromosome(&self, id: &str) -> Option<&ChromosomeEntry> {
        self.chromosomes.iter().find(|c| c.id == id)
    }

    /// Position of the chromosome in genome order.
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.chromosomes.iter().position(|c| c.id == id)
    }

    pub fn max_length(&self) -> u64 {
        self.chromosomes.iter().map(|c| c.length).max().unwrap_or(0)
    }

    pub fn total_length(&self) -> u64 {
        self.chromosomes.iter().map(|c| c.length).sum()
    }

    /// Genome-wide coordinate: lengths of all earlier chromosomes plus
    /// `position`. `None` for unknown chromosomes or on overflow.
    pub fn genome_offset(&self, id: &str, position: u64) -> Option<u64> {
        let rank = self.rank(id)?;
        let before: u64 = self.chromosomes[..rank].iter().map(|c| c.length).sum();
        before.checked_add(position)
    }
}

fn exons(spans: &[(u32, u64, u64)]) -> Vec<Exon> {
    spans
        .iter()
        .map(|&(exon_number, start, end)| Exon { start, end, exon_number })
        .collect()
}

fn builtin_genes() -> Vec<GeneAnnotation> {
    vec![
        GeneAnnotation::new(
            "ENSG00000141510",
            "TP53",
            "chr17",
            (7_668_402, 7_687_550),
            Strand::Minus,
            exons(&[
                (1, 7_687_377, 7_687_550),
                (2, 7_676_521, 7_676_622),
                (3, 7_676_382, 7_676_403),
                (4, 7_675_994, 7_676_272),
                (5, 7_675_053, 7_675_236),
                (6, 7_674_859, 7_674_971),
                (7, 7_674_180, 7_674_290),
                (8, 7_673_700, 7_673_837),
                (9, 7_673_535, 7_673_608),
                (10, 7_670_609, 7_670_715),
                (11, 7_668_402, 7_669_690),
            ]),
        )
        .with_description("Tumor suppressor p53"),
        GeneAnnotation::new(
            "ENSG00000133703",
            "KRAS",
            "chr12",
            (25_205_246, 25_250_929),
            Strand::Minus,
            exons(&[
                (1, 25_245_274, 25_245_395),
                (2, 25_227_299, 25_227_357),
                (3, 25_225_628, 25_225_757),
                (4, 25_219_904, 25_220_059),
                (5, 25_205_246, 25_205_400),
            ]),
        )
        .with_description("K-Ras proto-oncogene"),
        // partial exon list
        GeneAnnotation::new(
            "ENSG00000012048",
            "BRCA1",
            "chr17",
            (43_044_295, 43_125_483),
            Strand::Minus,
            exons(&[
                (1, 43_124_017, 43_124_115),
                (2, 43_106_455, 43_106_533),
                (3, 43_099_774, 43_099_827),
                (4, 43_097_244, 43_097_285),
                (5, 43_095_846, 43_095_934),
                (10, 43_063_874, 43_063_951),
                (24, 43_044_295, 43_045_802),
            ]),
        )
        .with_description("Breast cancer type 1 susceptibility protein"),
        GeneAnnotation::new(
            "ENSG00000139618",
            "BRCA2",
            "chr13",
            (32_315_474, 32_400_266),
            Strand::Plus,
            exons(&[
                (1, 32_315_474, 32_315_668),
                (2, 32_325_076, 32_325_184),
                (11, 32_336_264, 32_341_196),
                (27, 32_398_246, 32_399_672),
            ]),
        )
        .with_description("Breast cancer type 2 susceptibility protein"),
        GeneAnnotation::new(
            "ENSG00000136997",
            "MYC",
            "chr8",
            (127_735_434, 127_742_951),
            Strand::Plus,
            exons(&[
                (1, 127_735_434, 127_736_069),
                (2, 127_737_560, 127_738_367),
                (3, 127_740_922, 127_742_951),
            ]),
        )
        .with_description("Myc proto-oncogene protein"),
        GeneAnnotation::new(
            "ENSG00000100644",
            "HIF1A",
            "chr14",
            (61_695_514, 61_748_259),
            Strand::Plus,
            exons(&[(1, 61_695_514, 61_695_843), (15, 61_747_864, 61_748_259)]),
        )
        .with_description("Hypoxia-inducible factor 1-alpha"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn chromosomes_in_genome_order() {
        let reference = GenomeReference::hg38();
        let ids: Vec<&str> = reference.chromosomes().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 24);
        assert_eq!(ids[0], "chr1");
        assert_eq!(ids[21], "chr22");
        assert_eq!(ids[22], "chrX");
        assert_eq!(ids[23], "chrY");
        assert_eq!(reference.rank("chr10"), Some(9));
        assert_eq!(reference.rank("chrM"), None);
        assert_eq!(reference.max_length(), 248_956_422);
        assert_eq!(reference.genome_offset("chr1", 10), Some(10));
        assert_eq!(reference.genome_offset("chr3", 0), Some(248_956_422 + 242_193_529));
        assert_eq!(reference.genome_offset("chrM", 0), None);
        assert_eq!(reference.genome_offset("chr2", u64::MAX), None);
        assert_eq!(reference.genome_offset("chr1", u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn builtin_exons_sorted_physically() {
        let reference = GenomeReference::hg38();
        for gene in reference.genes() {
            assert!(gene.exons.windows(2).all(|w| w[0].start <= w[1].start), "{}", gene.gene_name);
        }
        let tp53 = reference.genes().iter().find(|g| g.gene_name == "TP53").unwrap();
        assert_eq!(tp53.exons.first().unwrap().exon_number, 11);
        assert_eq!(tp53.exons.last().unwrap().exon_number, 1);
    }

    #[test]
    fn custom_gene_table_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"geneId":"G1","geneName":"G","chromosome":"chr2","start":1000,"end":2000,
                "strand":"+","exons":[{{"start":1800,"end":1900,"exonNumber":2}},
                {{"start":1000,"end":1100,"exonNumber":1}}]}}]"#
        )
        .unwrap();
        let reference = GenomeReference::hg38().with_gene_table(file.path()).unwrap();
        assert_eq!(reference.genes().len(), 1);
        assert_eq!(reference.genes()[0].exons[0].exon_number, 1);
        assert_eq!(reference.chromosomes().len(), 24);
    }

    #[test]
    fn bare_numeric_gene_chromosomes_match_hits() {
        use crate::classifier::Classifier;
        use crate::data_handling::{ingest, InputFormat};
        use crate::models::GenomicContext;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"geneId":"G1","geneName":"G","chromosome":"17","start":1000,"end":2000,
                "strand":"+","exons":[{{"start":1400,"end":1600,"exonNumber":1}}]}}]"#
        )
        .unwrap();
        let reference = GenomeReference::hg38().with_gene_table(file.path()).unwrap();
        assert_eq!(reference.genes()[0].chromosome, "chr17");

        let report = ingest("chr,pos\n17,1500\n", InputFormat::Delimited, None);
        let hits = Classifier::default().classify_hits(&reference, &report.hits);
        assert_eq!(hits[0].chromosome, "chr17");
        assert_eq!(hits[0].region_type, GenomicContext::Exon);
        assert_eq!(hits[0].gene_name.as_deref(), Some("G"));
    }
}
