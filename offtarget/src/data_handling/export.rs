use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use polars::df;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::guide::GuideRna;
use crate::models::{OffTargetHit, Strand};

pub const EXPORT_COLUMNS: [&str; 9] = [
    "ID",
    "Chromosome",
    "Position",
    "Strand",
    "Sequence",
    "Mismatches",
    "CFD_Score",
    "Gene_Name",
    "Region_Type",
];

// BED intervals approximate the protospacer plus PAM around the reported position
const BED_UPSTREAM: u64 = 10;
const BED_DOWNSTREAM: u64 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Bed,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Bed => "bed",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "bed" => Ok(ExportFormat::Bed),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<GuideRna>,
    pub total_hits: usize,
    pub generator: String,
}

impl ExportMetadata {
    pub fn new(name: &str, guide: Option<GuideRna>, total_hits: usize) -> Self {
        Self {
            name: name.to_string(),
            guide,
            total_hits,
            generator: format!("offtarget {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn strand_or_plus(strand: Option<Strand>) -> &'static str {
    strand.unwrap_or(Strand::Plus).as_str()
}

/// The nine-column export table, one row per hit in input order.
pub fn hits_frame(hits: &[OffTargetHit]) -> Result<DataFrame> {
    let df = df!(
        "ID" => hits.iter().map(|h| h.id.clone()).collect::<Vec<_>>(),
        "Chromosome" => hits.iter().map(|h| h.chromosome.clone()).collect::<Vec<_>>(),
        "Position" => hits.iter().map(|h| h.position).collect::<Vec<u64>>(),
        "Strand" => hits.iter().map(|h| strand_or_plus(h.strand).to_string()).collect::<Vec<_>>(),
        "Sequence" => hits.iter().map(|h| h.sequence.clone()).collect::<Vec<_>>(),
        "Mismatches" => hits.iter().map(|h| h.mismatches).collect::<Vec<u32>>(),
        "CFD_Score" => hits.iter().map(|h| format!("{:.4}", h.cfd_score)).collect::<Vec<_>>(),
        "Gene_Name" => hits
            .iter()
            .map(|h| h.gene_name.clone().unwrap_or_else(|| "N/A".to_string()))
            .collect::<Vec<_>>(),
        "Region_Type" => hits.iter().map(|h| h.region_type.to_string()).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn write_delimited<W: Write>(hits: &[OffTargetHit], mut writer: W, separator: u8) -> Result<()> {
    let mut df = hits_frame(hits)?.select(EXPORT_COLUMNS)?;
    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(separator)
        .finish(&mut df)?;
    Ok(())
}

pub fn bed_line(hit: &OffTargetHit) -> String {
    let name = hit.gene_name.as_deref().unwrap_or(&hit.id);
    format!(
        "{}\t{}\t{}\t{}_{}MM\t{}\t{}",
        hit.chromosome,
        hit.position.saturating_sub(BED_UPSTREAM),
        hit.position.saturating_add(BED_DOWNSTREAM),
        name,
        hit.mismatches,
        (hit.cfd_score * 1000.0).round() as u32,
        strand_or_plus(hit.strand)
    )
}

pub fn write_bed<W: Write>(hits: &[OffTargetHit], track_name: &str, mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "track name=\"{}\" description=\"CRISPR Off-Targets\" useScore=1",
        track_name
    )?;
    for hit in hits {
        writeln!(writer, "{}", bed_line(hit))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: &'a ExportMetadata,
    hits: &'a [OffTargetHit],
}

pub fn write_json<W: Write>(hits: &[OffTargetHit], metadata: &ExportMetadata, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &JsonExport { metadata, hits })?;
    Ok(())
}

pub fn export<W: Write>(
    hits: &[OffTargetHit],
    format: ExportFormat,
    metadata: &ExportMetadata,
    writer: W,
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_delimited(hits, writer, b','),
        ExportFormat::Tsv => write_delimited(hits, writer, b'\t'),
        ExportFormat::Bed => write_bed(hits, &metadata.name, writer),
        ExportFormat::Json => write_json(hits, metadata, writer),
    }
}

pub fn export_to_file(
    hits: &[OffTargetHit],
    format: ExportFormat,
    metadata: &ExportMetadata,
    path: &Path,
) -> Result<()> {
    info!("Writing {} hits as {} to: {}", hits.len(), format.extension(), path.display());
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    export(hits, format, metadata, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenomicContext;

    fn hits() -> Vec<OffTargetHit> {
        vec![
            OffTargetHit::new("ot-001", "chr17", 7_673_700, "CCATTGTTCAATATCGTCCG", 0, 1.0)
                .with_gene(Some("TP53".into()))
                .with_context(GenomicContext::Exon)
                .with_strand(Some(Strand::Minus)),
            OffTargetHit::new("ot-005", "chr1", 5, "CCATTGTTCAATATCGTCCC", 2, 0.38149),
        ]
    }

    #[test]
    fn frame_has_fixed_columns_and_defaults() {
        let df = hits_frame(&hits()).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, EXPORT_COLUMNS);
        assert_eq!(df.height(), 2);

        let expected = df!(
            "Gene_Name" => &["TP53", "N/A"],
            "Strand" => &["-", "+"],
            "CFD_Score" => &["1.0000", "0.3815"]
        )
        .unwrap();
        let actual = df.select(["Gene_Name", "Strand", "CFD_Score"]).unwrap();
        assert!(actual.equals(&expected));
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut buf = Vec::new();
        write_delimited(&hits(), &mut buf, b',').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(EXPORT_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("ot-001,chr17,7673700,-,CCATTGTTCAATATCGTCCG,0,1.0000,TP53,Exon")
        );
        assert_eq!(lines.next(), Some("ot-005,chr1,5,+,CCATTGTTCAATATCGTCCC,2,0.3815,N/A,Unknown"));
    }

    #[test]
    fn tsv_uses_tabs() {
        let mut buf = Vec::new();
        export(&hits(), ExportFormat::Tsv, &ExportMetadata::new("run", None, 2), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("ID\tChromosome\tPosition"));
    }

    #[test]
    fn bed_rescales_score_and_clamps_start() {
        let mut buf = Vec::new();
        write_bed(&hits(), "my_run", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "track name=\"my_run\" description=\"CRISPR Off-Targets\" useScore=1"
        );
        assert_eq!(lines[1], "chr17\t7673690\t7673713\tTP53_0MM\t1000\t-");
        assert_eq!(lines[2], "chr1\t0\t18\tot-005_2MM\t381\t+");
    }

    #[test]
    fn bed_end_saturates_at_integer_limit() {
        let hit = OffTargetHit::new("edge", "chr1", u64::MAX - 3, "N", 0, 0.5);
        let line = bed_line(&hit);
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[1], (u64::MAX - 13).to_string());
        assert_eq!(fields[2], u64::MAX.to_string());

        let mut buf = Vec::new();
        write_bed(&[hit], "edge", &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 2);
    }

    #[test]
    fn json_wraps_metadata_and_hits() {
        let metadata = ExportMetadata::new("run", Some(GuideRna::default()), 2);
        let mut buf = Vec::new();
        write_json(&hits(), &metadata, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["metadata"]["totalHits"], 2);
        assert_eq!(value["metadata"]["guide"]["sequence"], "CCATTGTTCAATATCGTCCG");
        assert_eq!(value["hits"][0]["geneName"], "TP53");
        assert_eq!(value["hits"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn file_export_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.bed");
        export_to_file(&hits(), ExportFormat::Bed, &ExportMetadata::new("x", None, 2), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
