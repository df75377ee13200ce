use crate::domain::model::{MediaRecord, Platform, RunMeta};
use crate::utils::error::{Result, ScoutError};
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::sync::OnceLock;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const EXPORT_HEADERS: [&str; 16] = [
    "Hashtag",
    "Username",
    "View Count",
    "Like Count",
    "Comment Count",
    "Post URL",
    "Profile URL",
    "Region",
    "Follower Count",
    "Date",
    "Engagement",
    "Platform",
    "Post ID",
    "Timestamp",
    "Source",
    "Metrics Disabled",
];

/// Flat row written to CSV/TSV, in `EXPORT_HEADERS` order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    hashtag: Option<&'a str>,
    username: Option<&'a str>,
    view_count: u64,
    like_count: u64,
    comment_count: u64,
    post_url: Option<&'a str>,
    profile_url: Option<&'a str>,
    region: Option<&'a str>,
    follower_count: u64,
    date: String,
    engagement: u64,
    platform: Platform,
    post_id: Option<&'a str>,
    timestamp: Option<i64>,
    source: &'a str,
    metrics_disabled: bool,
}

impl<'a> From<&'a MediaRecord> for ExportRow<'a> {
    fn from(r: &'a MediaRecord) -> Self {
        Self {
            hashtag: r.hashtag.as_deref(),
            username: r.username.as_deref(),
            view_count: r.view_count,
            like_count: r.like_count,
            comment_count: r.comment_count,
            post_url: r.post_url.as_deref(),
            profile_url: r.profile_url.as_deref(),
            region: r.region.as_deref(),
            follower_count: r.follower_count,
            date: r.date_label(),
            engagement: r.engagement(),
            platform: r.platform,
            post_id: r.post_id.as_deref(),
            timestamp: r.created_at,
            source: &r.source,
            metrics_disabled: r.metrics_disabled,
        }
    }
}

fn delimited(records: &[MediaRecord], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScoutError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ScoutError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn to_csv(records: &[MediaRecord]) -> Result<String> {
    delimited(records, b',')
}

pub fn to_tsv(records: &[MediaRecord]) -> Result<String> {
    delimited(records, b'\t')
}

pub fn to_json(records: &[MediaRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// ZIP holding `results.csv`, `results.json` and `meta.json`.
pub fn to_zip_bundle(csv_output: &str, json_output: &str, meta: &RunMeta) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("results.csv", options)?;
    zip.write_all(csv_output.as_bytes())?;

    zip.start_file("results.json", options)?;
    zip.write_all(json_output.as_bytes())?;

    zip.start_file("meta.json", options)?;
    zip.write_all(serde_json::to_string_pretty(meta)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("static regex"))
}

pub fn sanitize_filename(value: &str) -> String {
    let cleaned = unsafe_chars().replace_all(value, "_");
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "export".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `{platform}_{targets}.{ext}`, e.g. `tiktok_bitcoin_crypto.csv`.
pub fn export_file_name(platform: Platform, targets: &[String], extension: &str) -> String {
    format!(
        "{}_{}.{}",
        platform,
        sanitize_filename(&targets.join("_")),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn records() -> Vec<MediaRecord> {
        vec![
            MediaRecord {
                hashtag: Some("#bitcoin".to_string()),
                username: Some("satoshi".to_string()),
                view_count: 1000,
                like_count: 50,
                comment_count: 5,
                post_url: Some("https://www.tiktok.com/@satoshi/video/1".to_string()),
                profile_url: Some("https://www.tiktok.com/@satoshi".to_string()),
                region: Some("Lisbon, PT".to_string()),
                follower_count: 7,
                post_id: Some("1".to_string()),
                created_at: Some(1_700_000_000),
                ..MediaRecord::empty(Platform::TikTok, "tiktok_hashtag")
            },
            MediaRecord::empty(Platform::TikTok, "tiktok_hashtag"),
        ]
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = to_csv(&records()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Hashtag,Username,View Count,Like Count,Comment Count"));
        assert!(lines[1].starts_with("#bitcoin,satoshi,1000,50,5,"));
        assert!(lines[1].contains("\"Lisbon, PT\""));
        assert!(lines[1].contains(",2023-11-14,1055,tiktok,1,1700000000,tiktok_hashtag,false"));
        assert!(lines[2].starts_with(",,0,0,0,,,,0,Unknown,0,tiktok,,,tiktok_hashtag,false"));
    }

    #[test]
    fn test_header_carries_raw_timestamp_column() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(
            csv.trim_end(),
            "Hashtag,Username,View Count,Like Count,Comment Count,Post URL,Profile URL,\
Region,Follower Count,Date,Engagement,Platform,Post ID,Timestamp,Source,Metrics Disabled"
        );
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let tsv = to_tsv(&records()).unwrap();
        let header = tsv.lines().next().unwrap();
        assert_eq!(header.split('\t').count(), EXPORT_HEADERS.len());
        assert!(tsv.contains("Lisbon, PT\t"));
    }

    #[test]
    fn test_json_is_an_array_of_records() {
        let json = to_json(&records()).unwrap();
        let parsed: Vec<MediaRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records());
    }

    #[test]
    fn test_zip_bundle_contents() {
        let meta = RunMeta {
            platform: "tiktok".to_string(),
            total_kept: 2,
            ..RunMeta::default()
        };
        let bytes = to_zip_bundle("a,b\n1,2\n", "[]", &meta).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["meta.json", "results.csv", "results.json"]);

        let mut content = String::new();
        archive
            .by_name("meta.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let meta_json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(meta_json["total_kept"], 2);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("bitcoin"), "bitcoin");
        assert_eq!(sanitize_filename("dog cat/€"), "dog_cat");
        assert_eq!(sanitize_filename("///"), "export");
        assert_eq!(sanitize_filename(""), "export");
    }

    #[test]
    fn test_export_file_name() {
        let targets = vec!["bitcoin".to_string(), "crypto".to_string()];
        assert_eq!(
            export_file_name(Platform::TikTok, &targets, "csv"),
            "tiktok_bitcoin_crypto.csv"
        );
        assert_eq!(export_file_name(Platform::Instagram, &[], "json"), "instagram_export.json");
    }
}
