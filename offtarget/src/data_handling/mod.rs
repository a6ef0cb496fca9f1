use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::OffTargetHit;

pub mod bed;
pub mod column_mapper;
pub mod delimited;
pub mod export;
pub mod samples;

/// Outcome of one ingestion. `errors` holds either a single fatal message
/// (and no hits) or one message per dropped row.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub hits: Vec<OffTargetHit>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Data rows seen, comments and blank lines excluded.
    pub total_rows: usize,
    pub fatal: bool,
}

impl ParseReport {
    pub fn fatal(message: String) -> Self {
        Self {
            errors: vec![message],
            fatal: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            total: self.total_rows,
            parsed: self.hits.len(),
            errors: if self.fatal { 1 } else { self.errors.len() },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    pub total: usize,
    pub parsed: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Bed,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" | "delimited" => Ok(InputFormat::Delimited),
            "bed" => Ok(InputFormat::Bed),
            other => Err(format!("unsupported input format '{}'", other)),
        }
    }
}

impl InputFormat {
    /// Extension first, then a look at the first meaningful line: BED has
    /// `track`/`browser` headers or a numeric second column.
    pub fn detect(path: &Path, content: &str) -> InputFormat {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Ok(format) = ext.parse::<InputFormat>() {
                return format;
            }
        }
        let first = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'));
        match first {
            Some(line) if line.starts_with("track") || line.starts_with("browser") => InputFormat::Bed,
            Some(line) => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() >= 3 && parse_position(fields[1]).is_ok() && !line.contains(',') {
                    InputFormat::Bed
                } else {
                    InputFormat::Delimited
                }
            }
            None => InputFormat::Delimited,
        }
    }
}

/// Integer, or an integral float such as `7673700.0`. Must be non-negative
/// and fit in a `u64`; no silent saturation of huge floats.
pub fn parse_position(raw: &str) -> std::result::Result<u64, String> {
    if raw.is_empty() {
        return Err("missing value".to_string());
    }
    if let Ok(p) = raw.parse::<u64>() {
        return Ok(p);
    }
    match raw.parse::<f64>() {
        Ok(f) if !f.is_finite() => Err("not a finite number".to_string()),
        Ok(f) if f < 0.0 => Err("position is negative".to_string()),
        Ok(f) if f >= u64::MAX as f64 => Err("position out of range".to_string()),
        Ok(f) if f.fract() == 0.0 => Ok(f as u64),
        _ => Err("not an integer".to_string()),
    }
}

/// Parses already-acquired text. `guide` is the fallback sequence for rows
/// that carry none, and the reference for mismatch estimation.
pub fn ingest(content: &str, format: InputFormat, guide: Option<&str>) -> ParseReport {
    let report = match format {
        InputFormat::Delimited => delimited::parse_delimited(content, guide),
        InputFormat::Bed => bed::parse_bed(content, guide),
    };
    if report.fatal {
        warn!("Ingestion failed: {}", report.errors.join("; "));
    } else {
        info!(
            "Ingested {} hits from {} rows ({} row errors)",
            report.hits.len(),
            report.total_rows,
            report.errors.len()
        );
    }
    report
}

pub fn ingest_file(path: &Path, format: Option<InputFormat>, guide: Option<&str>) -> Result<ParseReport> {
    info!("Reading off-target hits from: {}", path.display());
    let content = fs::read_to_string(path)?;
    let format = format.unwrap_or_else(|| InputFormat::detect(path, &content));
    Ok(ingest(&content, format, guide))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::detect(&PathBuf::from("hits.bed"), ""), InputFormat::Bed);
        assert_eq!(InputFormat::detect(&PathBuf::from("hits.TSV"), ""), InputFormat::Delimited);
    }

    #[test]
    fn format_sniffed_from_content() {
        let unknown = PathBuf::from("hits.dat");
        assert_eq!(InputFormat::detect(&unknown, "track name=x\nchr1\t1\t2\n"), InputFormat::Bed);
        assert_eq!(InputFormat::detect(&unknown, "chr1 100 123 siteA 500 -\n"), InputFormat::Bed);
        assert_eq!(InputFormat::detect(&unknown, "Chr,Pos\nchr1,100\n"), InputFormat::Delimited);
    }

    #[test]
    fn file_ingestion_uses_detected_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.bed");
        fs::write(&path, "chr1\t100\t123\tsiteA\t500\t-\n").unwrap();
        let report = ingest_file(&path, None, None).unwrap();
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.stats(), ParseStats { total: 1, parsed: 1, errors: 0 });
    }

    #[test]
    fn position_parsing_bounds() {
        assert_eq!(parse_position("100"), Ok(100));
        assert_eq!(parse_position("100.0"), Ok(100));
        assert_eq!(parse_position("18446744073709551615"), Ok(u64::MAX));
        assert!(parse_position("1e300").is_err());
        assert!(parse_position("18446744073709551616.0").is_err());
        assert!(parse_position("inf").is_err());
        assert!(parse_position("NaN").is_err());
        assert!(parse_position("-5").is_err());
        assert!(parse_position("12.5").is_err());
        assert!(parse_position("").is_err());
    }

    #[test]
    fn fatal_report_counts_one_error() {
        let report = ParseReport::fatal("no columns".into());
        assert!(report.is_empty());
        assert_eq!(report.stats().errors, 1);
    }
}
