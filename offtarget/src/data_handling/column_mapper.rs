use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new("[^a-z0-9]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Chromosome,
    Position,
    Sequence,
    Score,
    Mismatches,
    Gene,
    Strand,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::Chromosome,
        ColumnRole::Position,
        ColumnRole::Sequence,
        ColumnRole::Score,
        ColumnRole::Mismatches,
        ColumnRole::Gene,
        ColumnRole::Strand,
    ];

    /// Accepted header spellings, already in normalised form.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::Chromosome => &["chr", "chrom", "chromosome", "contig", "seqname"],
            ColumnRole::Position => &["pos", "position", "start", "location", "coordinate"],
            ColumnRole::Sequence => &["seq", "sequence", "dna", "offtargetsequence", "site"],
            ColumnRole::Score => &["score", "cfd", "cfdscore", "risk", "specificity"],
            ColumnRole::Mismatches => &["mm", "mismatches", "mismatchcount", "mutations"],
            ColumnRole::Gene => &["gene", "symbol", "locus", "target", "annotation"],
            ColumnRole::Strand => &["strand", "dir", "direction", "sense"],
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnRole::Chromosome => "chromosome",
            ColumnRole::Position => "position",
            ColumnRole::Sequence => "sequence",
            ColumnRole::Score => "score",
            ColumnRole::Mismatches => "mismatches",
            ColumnRole::Gene => "gene",
            ColumnRole::Strand => "strand",
        };
        write!(f, "{}", s)
    }
}

/// Semantic role -> zero-based column index, `None` when no header matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    slots: [Option<usize>; 7],
}

impl ColumnMapping {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.slots[role.slot()]
    }

    pub fn set(&mut self, role: ColumnRole, index: usize) {
        self.slots[role.slot()] = Some(index);
    }

    pub fn is_resolved(&self, role: ColumnRole) -> bool {
        self.get(role).is_some()
    }

    pub fn unresolved_required(&self) -> Vec<ColumnRole> {
        [ColumnRole::Chromosome, ColumnRole::Position]
            .into_iter()
            .filter(|r| !self.is_resolved(*r))
            .collect()
    }
}

pub fn normalize_header(header: &str) -> String {
    NON_ALNUM.replace_all(&header.to_lowercase(), "").into_owned()
}

/// Headers are visited left to right; the first header matching a role that
/// is still unmapped claims it, and each header claims at most one role.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for (index, header) in headers.iter().enumerate() {
        let h = normalize_header(header.as_ref());
        if let Some(role) = ColumnRole::ALL
            .iter()
            .find(|r| !mapping.is_resolved(**r) && r.synonyms().contains(&h.as_str()))
        {
            mapping.set(*role, index);
        }
    }
    mapping
}

/// Canonical `chrN` form. Idempotent.
pub fn normalize_chromosome(token: &str) -> String {
    let token = token.trim();
    let bare = match token.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &token[3..],
        _ => token,
    };
    if bare.eq_ignore_ascii_case("x") {
        "chrX".to_string()
    } else if bare.eq_ignore_ascii_case("y") {
        "chrY".to_string()
    } else if bare.eq_ignore_ascii_case("m") || bare.eq_ignore_ascii_case("mt") {
        "chrM".to_string()
    } else {
        format!("chr{}", bare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_short_headers() {
        let mapping = detect_columns(&["Chr", "Pos", "Seq", "Score", "MM", "Gene"]);
        assert_eq!(mapping.get(ColumnRole::Chromosome), Some(0));
        assert_eq!(mapping.get(ColumnRole::Position), Some(1));
        assert_eq!(mapping.get(ColumnRole::Sequence), Some(2));
        assert_eq!(mapping.get(ColumnRole::Score), Some(3));
        assert_eq!(mapping.get(ColumnRole::Mismatches), Some(4));
        assert_eq!(mapping.get(ColumnRole::Gene), Some(5));
        assert_eq!(mapping.get(ColumnRole::Strand), None);
        assert!(mapping.unresolved_required().is_empty());
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let mapping = detect_columns(&["Off-Target_Sequence", "CFD_Score", "Mismatch Count", "SeqName", "START"]);
        assert_eq!(mapping.get(ColumnRole::Sequence), Some(0));
        assert_eq!(mapping.get(ColumnRole::Score), Some(1));
        assert_eq!(mapping.get(ColumnRole::Mismatches), Some(2));
        assert_eq!(mapping.get(ColumnRole::Chromosome), Some(3));
        assert_eq!(mapping.get(ColumnRole::Position), Some(4));
    }

    #[test]
    fn first_matching_header_wins() {
        let mapping = detect_columns(&["id", "start", "position", "chrom", "contig"]);
        assert_eq!(mapping.get(ColumnRole::Position), Some(1));
        assert_eq!(mapping.get(ColumnRole::Chromosome), Some(3));
    }

    #[test]
    fn missing_required_roles_reported() {
        let mapping = detect_columns(&["sequence", "score"]);
        assert_eq!(
            mapping.unresolved_required(),
            vec![ColumnRole::Chromosome, ColumnRole::Position]
        );
    }

    #[test]
    fn chromosome_tokens_normalise() {
        assert_eq!(normalize_chromosome("17"), "chr17");
        assert_eq!(normalize_chromosome("x"), "chrX");
        assert_eq!(normalize_chromosome("Y"), "chrY");
        assert_eq!(normalize_chromosome("m"), "chrM");
        assert_eq!(normalize_chromosome("MT"), "chrM");
        assert_eq!(normalize_chromosome("Chr5"), "chr5");
        assert_eq!(normalize_chromosome("chrx"), "chrX");
        assert_eq!(normalize_chromosome(" chr2 "), "chr2");
    }

    #[test]
    fn chromosome_normalisation_is_idempotent() {
        for token in ["1", "22", "x", "Y", "m", "chr7", "CHRX", "chrUn_gl000220", "MT", "scaffold_9"] {
            let once = normalize_chromosome(token);
            assert_eq!(normalize_chromosome(&once), once, "token {}", token);
        }
    }
}
