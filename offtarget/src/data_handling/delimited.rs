use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::data_handling::column_mapper::{detect_columns, normalize_chromosome, ColumnMapping, ColumnRole};
use crate::data_handling::{parse_position, ParseReport};
use crate::error::{OffTargetError, RowError, RowField};
use crate::guide::{count_mismatches, GUIDE_LENGTH};
use crate::models::{OffTargetHit, Strand};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Picks the candidate delimiter that occurs most often in the header line.
pub fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    CANDIDATE_DELIMITERS
        .iter()
        .map(|&d| (d, header.bytes().filter(|&b| b == d).count()))
        .filter(|&(_, n)| n > 0)
        .max_by_key(|&(_, n)| n)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

/// How the mismatch count of a row was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MismatchSource {
    Column,
    Compared,
    /// Sequence length differs from the guide; count defaulted to 0.
    LengthMismatch,
    /// No guide to compare against; count defaulted to 0.
    NoReference,
}

/// One data row as strings, before field-by-field conversion.
struct RawRow<'a> {
    index: usize,
    record: &'a StringRecord,
    mapping: &'a ColumnMapping,
}

impl<'a> RawRow<'a> {
    fn get(&self, role: ColumnRole) -> Option<&'a str> {
        self.mapping
            .get(role)
            .and_then(|i| self.record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn row_number(&self) -> usize {
        self.index + 1
    }

    fn convert(&self, guide: Option<&str>) -> Result<(OffTargetHit, MismatchSource), RowError> {
        let chrom = self.get(ColumnRole::Chromosome).ok_or_else(|| {
            RowError::new(self.row_number(), RowField::Chromosome, "", "missing value")
        })?;
        let raw_pos = self.get(ColumnRole::Position).unwrap_or("");
        let position = parse_position(raw_pos)
            .map_err(|reason| RowError::new(self.row_number(), RowField::Position, raw_pos, reason))?;

        let sequence = self
            .get(ColumnRole::Sequence)
            .map(str::to_string)
            .or_else(|| guide.map(str::to_string))
            .unwrap_or_else(|| "N".repeat(GUIDE_LENGTH))
            .to_uppercase();

        let (mismatches, source) = match self.get(ColumnRole::Mismatches).and_then(parse_count) {
            Some(mm) => (mm, MismatchSource::Column),
            None => match guide {
                Some(g) => match count_mismatches(g, &sequence) {
                    Some(mm) => (mm, MismatchSource::Compared),
                    None => (0, MismatchSource::LengthMismatch),
                },
                None => (0, MismatchSource::NoReference),
            },
        };

        let hit = OffTargetHit::new(
            format!("row-{}", self.index),
            normalize_chromosome(chrom),
            position,
            sequence,
            mismatches,
            normalize_score(self.get(ColumnRole::Score)),
        )
        .with_gene(self.get(ColumnRole::Gene).map(str::to_string))
        .with_strand(self.get(ColumnRole::Strand).and_then(Strand::from_symbol));

        Ok((hit, source))
    }
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Some(f as u32),
        _ => None,
    })
}

/// Scores above 1 are read as percentages. Unparseable scores become 0.
fn normalize_score(raw: Option<&str>) -> f64 {
    match raw.and_then(|s| s.parse::<f64>().ok()) {
        Some(s) if s.is_finite() && s > 1.0 => s / 100.0,
        Some(s) if s.is_finite() => s,
        _ => 0.0,
    }
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnMapping, OffTargetError> {
    let mapping = detect_columns(&headers.iter().collect::<Vec<_>>());
    let missing = mapping.unresolved_required();
    if missing.is_empty() {
        Ok(mapping)
    } else {
        let names: Vec<String> = missing.iter().map(|r| r.to_string()).collect();
        Err(OffTargetError::MissingColumns(format!(
            "Could not identify {} column(s). Please check headers.",
            names.join(" and ")
        )))
    }
}

/// Header row required. Fails as a whole only when chromosome or position
/// cannot be resolved; otherwise bad rows are reported and skipped.
pub fn parse_delimited(content: &str, guide: Option<&str>) -> ParseReport {
    let delimiter = sniff_delimiter(content);
    debug!("Using delimiter {:?}", delimiter as char);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => return ParseReport::fatal(format!("Could not read header row: {}", e)),
    };
    let mapping = match resolve_columns(&headers) {
        Ok(m) => m,
        Err(e) => return ParseReport::fatal(e.to_string()),
    };
    debug!("Column mapping: {:?}", mapping);

    let mut report = ParseReport::default();
    let mut length_mismatch = 0usize;
    let mut no_reference = 0usize;
    let mut index = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.total_rows += 1;
                report
                    .errors
                    .push(RowError::new(index + 1, RowField::Record, "", e.to_string()).to_string());
                index += 1;
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        report.total_rows += 1;

        let row = RawRow { index, record: &record, mapping: &mapping };
        match row.convert(guide) {
            Ok((hit, source)) => {
                match source {
                    MismatchSource::LengthMismatch => length_mismatch += 1,
                    MismatchSource::NoReference => no_reference += 1,
                    MismatchSource::Column | MismatchSource::Compared => {}
                }
                report.hits.push(hit);
            }
            Err(e) => report.errors.push(e.to_string()),
        }
        index += 1;
    }

    if length_mismatch > 0 {
        report.warnings.push(format!(
            "{} row(s): sequence length differs from the guide; mismatch count defaulted to 0",
            length_mismatch
        ));
    }
    if no_reference > 0 && mapping.is_resolved(ColumnRole::Sequence) {
        report.warnings.push(format!(
            "{} row(s): no mismatch column and no guide sequence; mismatch count defaulted to 0",
            no_reference
        ));
    }
    report
}
