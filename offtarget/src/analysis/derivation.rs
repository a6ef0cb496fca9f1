//! Filtered and sorted views over the working set.
//!
//! `derive` is pure: the same (hits, filter, sort) always yields the same
//! two vectors, so callers are free to memoise on those inputs.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_handling::column_mapper::normalize_chromosome;
use crate::models::{GenomicContext, OffTargetHit};

pub const DEFAULT_MAX_MISMATCHES: u32 = 6;

/// Region predicate. A value that names no known context matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionFilter {
    #[default]
    All,
    Context(GenomicContext),
    Unrecognized(String),
}

impl RegionFilter {
    pub fn matches(&self, context: GenomicContext) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Context(c) => *c == context,
            RegionFilter::Unrecognized(_) => false,
        }
    }
}

impl From<&str> for RegionFilter {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            RegionFilter::All
        } else {
            s.parse::<GenomicContext>()
                .map(RegionFilter::Context)
                .unwrap_or_else(|_| RegionFilter::Unrecognized(s.to_string()))
        }
    }
}

impl From<String> for RegionFilter {
    fn from(s: String) -> Self {
        RegionFilter::from(s.as_str())
    }
}

impl From<RegionFilter> for String {
    fn from(region: RegionFilter) -> Self {
        region.to_string()
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => write!(f, "ALL"),
            RegionFilter::Context(c) => write!(f, "{}", c.as_str().to_ascii_uppercase()),
            RegionFilter::Unrecognized(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub min_score: f64,
    pub max_mismatches: u32,
    pub region: RegionFilter,
    /// Empty means every chromosome.
    pub chromosomes: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_mismatches: DEFAULT_MAX_MISMATCHES,
            region: RegionFilter::All,
            chromosomes: Vec::new(),
        }
    }
}

impl FilterState {
    pub fn with_chromosomes<S: AsRef<str>>(mut self, chromosomes: &[S]) -> Self {
        self.chromosomes = chromosomes
            .iter()
            .map(|c| normalize_chromosome(c.as_ref()))
            .collect();
        self
    }

    pub fn matches(&self, hit: &OffTargetHit) -> bool {
        hit.cfd_score >= self.min_score
            && hit.mismatches <= self.max_mismatches
            && self.region.matches(hit.region_type)
            && (self.chromosomes.is_empty() || self.chromosomes.iter().any(|c| *c == hit.chromosome))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortKey {
    #[default]
    ScoreDesc,
    ScoreAsc,
    MismatchAsc,
    Position,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::ScoreDesc, SortKey::ScoreAsc, SortKey::MismatchAsc, SortKey::Position];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::ScoreDesc => "SCORE_DESC",
            SortKey::ScoreAsc => "SCORE_ASC",
            SortKey::MismatchAsc => "MISMATCH_ASC",
            SortKey::Position => "POSITION",
        }
    }

    /// Primary key for this sort, ties broken by natural id order.
    pub fn compare(&self, a: &OffTargetHit, b: &OffTargetHit) -> Ordering {
        let primary = match self {
            SortKey::ScoreDesc => b.cfd_score.total_cmp(&a.cfd_score),
            SortKey::ScoreAsc => a.cfd_score.total_cmp(&b.cfd_score),
            SortKey::MismatchAsc => a.mismatches.cmp(&b.mismatches),
            SortKey::Position => natural_cmp(&a.chromosome, &b.chromosome).then(a.position.cmp(&b.position)),
        };
        primary.then_with(|| natural_cmp(&a.id, &b.id))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        SortKey::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(&wanted))
            .copied()
            .ok_or_else(|| format!("unknown sort key '{}'", s))
    }
}

/// Numeric-aware string order: digit runs compare by value, so
/// `chr2 < chr10` and `row-9 < row-10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (si, sj) = (i, j);
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let na = trim_zeros(&a[si..i]);
            let nb = trim_zeros(&b[sj..j]);
            let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let first = digits.iter().position(|&d| d != b'0').unwrap_or(digits.len());
    &digits[first..]
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    pub filtered: Vec<OffTargetHit>,
    pub sorted: Vec<OffTargetHit>,
}

pub fn filter_hits(hits: &[OffTargetHit], filter: &FilterState) -> Vec<OffTargetHit> {
    hits.iter().filter(|h| filter.matches(h)).cloned().collect()
}

pub fn sort_hits(hits: &[OffTargetHit], sort: SortKey) -> Vec<OffTargetHit> {
    let mut sorted = hits.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// `sorted` is always built from `filtered`.
pub fn derive(hits: &[OffTargetHit], filter: &FilterState, sort: SortKey) -> DerivedView {
    let filtered = filter_hits(hits, filter);
    let sorted = sort_hits(&filtered, sort);
    DerivedView { filtered, sorted }
}
