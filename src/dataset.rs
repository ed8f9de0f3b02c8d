//! Dataset loading, validation and the frame index.
//!
//! The dataset is loaded once, validated once, and treated as immutable for
//! the process lifetime. Per-frame computation downstream assumes a valid,
//! non-empty dataset; everything that can be rejected is rejected here.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::record::MetricRecord;

/// Immutable record store plus the precomputed frame index.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<MetricRecord>,
    dates: Vec<String>,
}

impl Dataset {
    /// Build from in-memory records. Fails on an empty dataset so callers
    /// surface a "no data" state instead of computing vacuous frames.
    pub fn new(records: Vec<MetricRecord>) -> Result<Self> {
        if records.is_empty() {
            bail!("dataset is empty: no metric records to race");
        }
        let mut dates: Vec<String> = records
            .iter()
            .map(|r| r.date.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        dates.sort();
        Ok(Self { records, dates })
    }

    /// Load a JSON array of records from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read dataset {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid dataset {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let records: Vec<MetricRecord> =
            serde_json::from_str(raw).context("dataset is not a JSON array of metric records")?;
        Self::new(records)
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Sorted distinct dates; one animation frame per entry.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn frame_count(&self) -> usize {
        self.dates.len()
    }

    /// Date for a frame index, `None` when out of range.
    pub fn date_for(&self, frame: usize) -> Option<&str> {
        self.dates.get(frame).map(|s| s.as_str())
    }

    /// Clamp an arbitrary frame request into the valid range. Scrubber UIs
    /// send out-of-range values mid-drag; those clamp rather than fail.
    pub fn clamp_frame(&self, frame: usize) -> usize {
        frame.min(self.frame_count().saturating_sub(1))
    }

    pub fn last_frame(&self) -> usize {
        self.frame_count() - 1
    }

    /// Records for a single date, in dataset order.
    pub fn records_for_date<'a>(&'a self, date: &'a str) -> impl Iterator<Item = &'a MetricRecord> {
        self.records.iter().filter(move |r| r.date == date)
    }
}

/// Provenance and shape summary for a dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub record_count: u64,
    pub team_count: u64,
    pub frame_count: u64,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
    pub warnings: Vec<String>,
    pub generated_at_epoch: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub records: u64,
    pub duplicate_keys: u64,
    pub scores_out_of_range: u64,
    pub unparsable_dates: u64,
    pub warnings: Vec<String>,
}

/// Validate a dataset file and summarize its shape. Warnings are advisory;
/// only an unreadable or empty file is a hard error.
pub fn analyze_file(path: &Path, now_epoch: u64) -> Result<(DatasetManifest, DataQualityReport)> {
    let hash = file_sha256(path)?;
    let dataset = Dataset::load(path)?;
    let (manifest, report) = analyze_records(&dataset, now_epoch);
    Ok((
        DatasetManifest {
            path: path.display().to_string(),
            hash_sha256: hash,
            ..manifest
        },
        report,
    ))
}

fn analyze_records(dataset: &Dataset, now_epoch: u64) -> (DatasetManifest, DataQualityReport) {
    let mut warnings = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut duplicate_keys = 0u64;
    let mut scores_out_of_range = 0u64;
    let mut unparsable_dates = 0u64;
    let mut teams: HashSet<&str> = HashSet::new();

    for rec in dataset.records() {
        teams.insert(rec.team.as_str());
        let key = (rec.date.clone(), rec.team.clone(), rec.project.clone());
        if !seen.insert(key) {
            duplicate_keys += 1;
            warnings.push(format!(
                "duplicate_key: date={} team={} project={}",
                rec.date, rec.team, rec.project
            ));
        }
        if !(0.0..=100.0).contains(&rec.security_score) {
            scores_out_of_range += 1;
            warnings.push(format!(
                "score_out_of_range: team={} project={} score={}",
                rec.team, rec.project, rec.security_score
            ));
        }
        if NaiveDate::parse_from_str(&rec.date, "%Y-%m-%d").is_err() {
            unparsable_dates += 1;
            warnings.push(format!("unparsable_date: {}", rec.date));
        }
    }

    let manifest = DatasetManifest {
        path: String::new(),
        hash_sha256: String::new(),
        record_count: dataset.records().len() as u64,
        team_count: teams.len() as u64,
        frame_count: dataset.frame_count() as u64,
        date_min: dataset.dates().first().cloned(),
        date_max: dataset.dates().last().cloned(),
        warnings: warnings.clone(),
        generated_at_epoch: now_epoch,
    };
    let report = DataQualityReport {
        records: dataset.records().len() as u64,
        duplicate_keys,
        scores_out_of_range,
        unparsable_dates,
        warnings,
    };
    (manifest, report)
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("metrics.json");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
