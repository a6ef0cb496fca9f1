//! Genomic context lookup against the gene table.
//!
//! A linear scan is enough for a handful of genes. A genome-scale annotation
//! set would need an interval tree keyed per chromosome instead.

use std::collections::BTreeMap;

use tracing::info;

use crate::models::{GeneAnnotation, GenomicContext, OffTargetHit};
use crate::reference::GenomeReference;

pub const PROMOTER_WINDOW: u64 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneContextResult<'a> {
    pub context: GenomicContext,
    pub gene: Option<&'a GeneAnnotation>,
    pub exon_number: Option<u32>,
    /// Distance to the nearest gene on the same chromosome, intergenic only.
    pub distance_to_gene: Option<u64>,
}

impl<'a> GeneContextResult<'a> {
    fn within(context: GenomicContext, gene: &'a GeneAnnotation) -> Self {
        Self {
            context,
            gene: Some(gene),
            exon_number: None,
            distance_to_gene: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    pub promoter_window: u64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self { promoter_window: PROMOTER_WINDOW }
    }
}

impl Classifier {
    pub fn new(promoter_window: u64) -> Self {
        Self { promoter_window }
    }

    fn matches(&self, gene: &GeneAnnotation, chromosome: &str, position: u64) -> bool {
        gene.chromosome == chromosome
            && (gene.contains(position) || gene.in_promoter(position, self.promoter_window))
    }

    /// First gene in table order whose body or promoter window covers the
    /// position decides the result. Promoter beats body; inside the body an
    /// exon hit gives `Exon`, anything else `Intron`.
    pub fn classify<'a>(
        &self,
        reference: &'a GenomeReference,
        chromosome: &str,
        position: u64,
    ) -> GeneContextResult<'a> {
        let Some(gene) = reference
            .genes()
            .iter()
            .find(|g| self.matches(g, chromosome, position))
        else {
            let distance_to_gene = reference
                .genes()
                .iter()
                .filter(|g| g.chromosome == chromosome)
                .map(|g| g.distance_to(position))
                .min();
            return GeneContextResult {
                context: GenomicContext::Intergenic,
                gene: None,
                exon_number: None,
                distance_to_gene,
            };
        };

        if gene.in_promoter(position, self.promoter_window) {
            return GeneContextResult::within(GenomicContext::Promoter, gene);
        }
        if let Some(exon) = gene.exons.iter().find(|e| e.contains(position)) {
            return GeneContextResult {
                exon_number: Some(exon.exon_number),
                ..GeneContextResult::within(GenomicContext::Exon, gene)
            };
        }
        GeneContextResult::within(GenomicContext::Intron, gene)
    }

    /// Returns a new record set with `Unknown` contexts resolved. Records
    /// that already carry a context pass through untouched; a matched gene
    /// name is only filled in where the record had none.
    pub fn classify_hits(&self, reference: &GenomeReference, hits: &[OffTargetHit]) -> Vec<OffTargetHit> {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let classified: Vec<OffTargetHit> = hits
            .iter()
            .map(|hit| {
                if hit.region_type != GenomicContext::Unknown {
                    return hit.clone();
                }
                let result = self.classify(reference, &hit.chromosome, hit.position);
                *counts.entry(result.context.as_str()).or_default() += 1;
                let gene_name = hit
                    .gene_name
                    .clone()
                    .or_else(|| result.gene.map(|g| g.gene_name.clone()));
                hit.clone().with_gene(gene_name).with_context(result.context)
            })
            .collect();
        info!("Classified {} previously unknown hits: {:?}", counts.values().sum::<usize>(), counts);
        classified
    }
}

pub fn classify<'a>(reference: &'a GenomeReference, chromosome: &str, position: u64) -> GeneContextResult<'a> {
    Classifier::default().classify(reference, chromosome, position)
}
