use serde::{Deserialize, Serialize};

pub const GUIDE_LENGTH: usize = 20;
pub const DEFAULT_PAM: &str = "NGG";

pub const EXAMPLE_GUIDES: [(&str, &str); 3] = [
    ("TP53 Exon 2", "CCATTGTTCAATATCGTCCG"),
    ("VEGFA Site 3", "GGTGAGTGAGTGTGTGCGTG"),
    ("EMX1 Target", "GTCACCTCCAATGACTAGGG"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideRna {
    pub name: String,
    pub sequence: String,
    pub pam: String,
    #[serde(default)]
    pub target_gene: Option<String>,
}

impl GuideRna {
    /// Sequence is sanitised and cut to the 20-nt protospacer.
    pub fn new(name: &str, sequence: &str) -> Self {
        let mut sequence = sanitize_dna(sequence);
        sequence.truncate(GUIDE_LENGTH);
        Self {
            name: name.to_string(),
            sequence,
            pam: DEFAULT_PAM.to_string(),
            target_gene: None,
        }
    }

    pub fn with_pam(mut self, pam: &str) -> Self {
        self.pam = sanitize_dna(pam);
        self
    }

    pub fn with_target_gene(mut self, gene: &str) -> Self {
        self.target_gene = Some(gene.to_string());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.sequence.len() == GUIDE_LENGTH
    }

    pub fn gc_content(&self) -> f64 {
        gc_content(&self.sequence)
    }
}

impl Default for GuideRna {
    fn default() -> Self {
        let (name, seq) = EXAMPLE_GUIDES[0];
        GuideRna::new(name, seq).with_target_gene("TP53")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchDetail {
    /// 0-based offset within the protospacer.
    pub position: usize,
    pub reference: char,
    pub actual: char,
}

pub fn is_valid_nucleotide(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')
}

/// Uppercases and drops anything that is not A/C/G/T/N.
pub fn sanitize_dna(input: &str) -> String {
    input
        .chars()
        .filter(|c| is_valid_nucleotide(*c))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// GC percentage (0-100).
pub fn gc_content(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.chars().filter(|c| matches!(c.to_ascii_uppercase(), 'G' | 'C')).count();
    gc as f64 / seq.chars().count() as f64 * 100.0
}

/// Positional comparison, case-insensitive. `None` when lengths differ;
/// no alignment is attempted.
pub fn mismatch_details(reference: &str, actual: &str) -> Option<Vec<MismatchDetail>> {
    let reference: Vec<char> = reference.chars().map(|c| c.to_ascii_uppercase()).collect();
    let actual: Vec<char> = actual.chars().map(|c| c.to_ascii_uppercase()).collect();
    if reference.len() != actual.len() {
        return None;
    }
    Some(
        reference
            .iter()
            .zip(actual.iter())
            .enumerate()
            .filter(|(_, (r, a))| r != a)
            .map(|(position, (&reference, &actual))| MismatchDetail {
                position,
                reference,
                actual,
            })
            .collect(),
    )
}

pub fn count_mismatches(reference: &str, actual: &str) -> Option<u32> {
    mismatch_details(reference, actual).map(|d| d.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sanitize_keeps_nucleotides_only() {
        assert_eq!(sanitize_dna("ac g-t\nnX"), "ACGTN");
        let guide = GuideRna::new("long", "CCATTGTTCAATATCGTCCGAAAA");
        assert_eq!(guide.sequence.len(), GUIDE_LENGTH);
        assert!(guide.is_valid());
        assert!(!GuideRna::new("short", "ACGT").is_valid());
    }

    #[test]
    fn pam_is_sanitised() {
        let guide = GuideRna::new("g", "CCATTGTTCAATATCGTCCG").with_pam(" nag ");
        assert_eq!(guide.pam, "NAG");
        assert_eq!(GuideRna::new("g", "ACGT").pam, DEFAULT_PAM);
    }

    #[test]
    fn gc_content_percent() {
        assert_relative_eq!(gc_content("GGCC"), 100.0);
        assert_relative_eq!(gc_content("ATGC"), 50.0);
        assert_eq!(gc_content(""), 0.0);
    }

    #[test]
    fn mismatches_require_equal_length() {
        let details = mismatch_details("CCATTGTTCAATATCGTCCG", "ccattgttcaatatcgtcct").unwrap();
        assert_eq!(details, vec![MismatchDetail { position: 19, reference: 'G', actual: 'T' }]);
        assert_eq!(count_mismatches("ACGT", "ACG"), None);
        assert_eq!(count_mismatches("ACGT", "TCGA"), Some(2));
    }
}
