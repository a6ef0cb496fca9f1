//! Owner of the current working set.
//!
//! The pipeline functions stay pure; this controller holds the one mutable
//! record set, bumps a generation counter on every change and memoises the
//! derived view and the arc layout on their inputs.

use tracing::{debug, info, warn};

use crate::analysis::derivation::{derive, DerivedView, FilterState, SortKey};
use crate::classifier::Classifier;
use crate::data_handling::samples::mock_analysis;
use crate::data_handling::{ParseReport, ParseStats};
use crate::models::OffTargetHit;
use crate::projection::polar::compute_arcs;
use crate::projection::{ArcDefinition, LinearProjection, PanelSize, PolarProjection};
use crate::reference::GenomeReference;

#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    generation: u64,
    filter: FilterState,
    sort: SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcKey {
    panel: PanelSize,
    padding: f64,
}

#[derive(Debug, Clone)]
struct ArcLayout {
    arcs: Vec<ArcDefinition>,
    padding: f64,
}

#[derive(Debug)]
pub struct AnalysisSession {
    reference: GenomeReference,
    classifier: Classifier,
    hits: Vec<OffTargetHit>,
    generation: u64,
    file_name: Option<String>,
    parse_stats: Option<ParseStats>,
    error: Option<String>,
    warnings: Vec<String>,
    /// Per-row rejections of the last non-fatal import.
    row_errors: Vec<String>,
    view_cache: Option<(ViewKey, DerivedView)>,
    arc_cache: Option<(ArcKey, ArcLayout)>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(GenomeReference::hg38(), Classifier::default())
    }
}

impl AnalysisSession {
    pub fn new(reference: GenomeReference, classifier: Classifier) -> Self {
        Self {
            reference,
            classifier,
            hits: Vec::new(),
            generation: 0,
            file_name: None,
            parse_stats: None,
            error: None,
            warnings: Vec::new(),
            row_errors: Vec::new(),
            view_cache: None,
            arc_cache: None,
        }
    }

    pub fn reference(&self) -> &GenomeReference {
        &self.reference
    }

    pub fn hits(&self) -> &[OffTargetHit] {
        &self.hits
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn parse_stats(&self) -> Option<ParseStats> {
        self.parse_stats
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn row_errors(&self) -> &[String] {
        &self.row_errors
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    fn replace(&mut self, hits: Vec<OffTargetHit>) {
        self.hits = self.classifier.classify_hits(&self.reference, &hits);
        self.generation += 1;
    }

    /// Replaces the working set and clears any error.
    pub fn set_hits(&mut self, hits: Vec<OffTargetHit>) {
        self.replace(hits);
        self.error = None;
    }

    pub fn add_hits(&mut self, hits: Vec<OffTargetHit>) {
        let added = self.classifier.classify_hits(&self.reference, &hits);
        self.hits.extend(added);
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.parse_stats = None;
        self.file_name = None;
        self.error = None;
        self.warnings.clear();
        self.row_errors.clear();
        self.generation += 1;
        info!("Working set cleared");
    }

    /// Adopts the outcome of one ingestion. The latest call wins; a fatal
    /// report keeps the previous hits and records the error instead.
    pub fn import(&mut self, file_name: &str, report: ParseReport) -> ParseStats {
        let stats = report.stats();
        self.parse_stats = Some(stats);
        self.file_name = Some(file_name.to_string());
        self.warnings = report.warnings.clone();
        self.row_errors.clear();
        if report.fatal {
            let message = report.errors.join("; ");
            warn!("Import of {} failed: {}", file_name, message);
            self.set_error(Some(message));
            return stats;
        }
        if report.hits.is_empty() {
            warn!("Import of {} produced no usable rows", file_name);
        }
        self.row_errors = report.errors;
        self.set_hits(report.hits);
        info!(
            "Imported {}: {} of {} rows ({} errors)",
            file_name, stats.parsed, stats.total, stats.errors
        );
        stats
    }

    pub fn run_mock_analysis(&mut self, seed: u64) {
        info!("Running mock analysis with seed {}", seed);
        self.set_hits(mock_analysis(seed));
        self.file_name = None;
        self.parse_stats = None;
    }

    /// Derived view for the current working set, recomputed only when the
    /// set, filter or sort changed since the last call.
    pub fn view(&mut self, filter: &FilterState, sort: SortKey) -> &DerivedView {
        let key = ViewKey {
            generation: self.generation,
            filter: filter.clone(),
            sort,
        };
        if self.view_cache.as_ref().is_some_and(|(k, _)| *k != key) {
            self.view_cache = None;
        }
        let hits = &self.hits;
        let (_, view) = self.view_cache.get_or_insert_with(|| {
            debug!("Deriving view for generation {} sorted by {}", key.generation, sort);
            let view = derive(hits, filter, sort);
            (key, view)
        });
        view
    }

    fn arc_layout(&mut self, panel: PanelSize, padding: f64) -> &ArcLayout {
        let key = ArcKey { panel, padding };
        if self.arc_cache.as_ref().is_some_and(|(k, _)| *k != key) {
            self.arc_cache = None;
        }
        let reference = &self.reference;
        let (_, layout) = self.arc_cache.get_or_insert_with(|| {
            let (arcs, padding) = compute_arcs(reference, padding);
            (key, ArcLayout { arcs, padding })
        });
        layout
    }

    pub fn polar(&mut self, panel: PanelSize, padding: f64, track_width: f64) -> PolarProjection {
        let layout = self.arc_layout(panel, padding).clone();
        PolarProjection::from_arcs(layout.arcs, panel, layout.padding, track_width)
    }

    pub fn linear(&self, panel: PanelSize) -> LinearProjection {
        LinearProjection::new(&self.reference, panel)
    }
}
