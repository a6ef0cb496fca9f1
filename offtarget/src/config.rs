//! Viewer configuration.
//!
//! Looked up in this order: an explicit path, `$OFFTARGET_CONFIG`,
//! `<project root>/offtarget.json`, then built-in defaults. Command-line
//! flags are applied on top by the caller.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::derivation::{FilterState, SortKey};
use crate::classifier::{Classifier, PROMOTER_WINDOW};
use crate::error::{OffTargetError, Result};
use crate::guide::GuideRna;
use crate::helper_functions::project_root;
use crate::projection::polar::{DEFAULT_PADDING, DEFAULT_TRACK_WIDTH};
use crate::projection::PanelSize;
use crate::reference::GenomeReference;

pub const CONFIG_ENV: &str = "OFFTARGET_CONFIG";
pub const CONFIG_FILE: &str = "offtarget.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    pub panel_width: f64,
    pub panel_height: f64,
    /// Gap between chromosome arcs in radians.
    pub padding: f64,
    pub track_width: f64,
    pub promoter_window: u64,
    pub filter: FilterState,
    pub sort: SortKey,
    pub guide: GuideRna,
    /// JSON list of gene annotations replacing the built-in table.
    pub gene_table: Option<PathBuf>,
    pub mock_seed: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            panel_width: 800.0,
            panel_height: 600.0,
            padding: DEFAULT_PADDING,
            track_width: DEFAULT_TRACK_WIDTH,
            promoter_window: PROMOTER_WINDOW,
            filter: FilterState::default(),
            sort: SortKey::default(),
            guide: GuideRna::default(),
            gene_table: None,
            mock_seed: 42,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Reading viewer config from: {}", path.display());
        let text = fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_from(explicit, env::var_os(CONFIG_ENV), &project_root())
    }

    pub fn resolve_from(explicit: Option<&Path>, from_env: Option<OsString>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = from_env.filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }
        let fallback = root.join(CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(&fallback);
        }
        debug!("No viewer config found, using defaults");
        Ok(Self::default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.panel_width) || !positive(self.panel_height) {
            return Err(OffTargetError::Config(format!(
                "panel size must be positive, got {}x{}",
                self.panel_width, self.panel_height
            )));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(OffTargetError::Config(format!("padding must be >= 0, got {}", self.padding)));
        }
        if !self.track_width.is_finite() || self.track_width < 0.0 {
            return Err(OffTargetError::Config(format!(
                "track width must be >= 0, got {}",
                self.track_width
            )));
        }
        if !(0.0..=1.0).contains(&self.filter.min_score) {
            return Err(OffTargetError::Config(format!(
                "minimum score must lie in [0, 1], got {}",
                self.filter.min_score
            )));
        }
        Ok(())
    }

    pub fn panel(&self) -> PanelSize {
        PanelSize::new(self.panel_width, self.panel_height)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.promoter_window)
    }

    pub fn reference(&self) -> Result<GenomeReference> {
        match &self.gene_table {
            Some(path) => GenomeReference::hg38().with_gene_table(path),
            None => Ok(GenomeReference::hg38()),
        }
    }
}
