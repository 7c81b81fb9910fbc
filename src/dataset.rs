//! Turn a directory of committed recordings into train/test manifests with
//! ffmpeg-augmented variants.
//!
//! Originals land in `test.csv`; each augmentation (echo, reverb, four pitch
//! shifts) lands in `train.csv`. Transcripts come straight back out of the
//! file names the recorder committed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, warn};

/// Pitch-shift factors applied to every recording for training variety.
const PITCH_FACTORS: [f64; 4] = [0.5, 0.75, 1.5, 2.0];

/// One committed recording plus the transcript recovered from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCase {
    path: PathBuf,
}

impl DatasetCase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recover the spoken phrase: strip the augmentation suffix (anything
    /// after the first '-') and the extension, then map underscores back to
    /// spaces.
    pub fn phrase(&self) -> String {
        let name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let stem = name.split('-').next().unwrap_or(name);
        let stem = stem.split('.').next().unwrap_or(stem);
        stem.chars()
            .map(|ch| if ch == '_' { ' ' } else { ch })
            .collect()
    }

    pub fn size(&self) -> Result<u64> {
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("failed to stat '{}'", self.path.display()))?;
        Ok(metadata.len())
    }
}

/// Collect the original recordings in `dir`, sorted by file name. Augmented
/// variants carry a '-suffix' and are excluded by the name pattern.
pub fn collect_cases(dir: &Path) -> Result<Vec<DatasetCase>> {
    let original = Regex::new(r"^[a-z_.]+\.wav$").context("case name pattern")?;
    let mut cases = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if original.is_match(&name) {
            cases.push(DatasetCase::new(entry.path()));
        }
    }
    cases.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(cases)
}

/// Run one ffmpeg filter over `src`, writing `target`. Returns the produced
/// case, or None when the target already exists (without `overwrite`) or
/// ffmpeg fails; failures are logged and skipped so one bad file cannot sink
/// the whole run.
pub fn ffmpeg_filter(src: &Path, target: &Path, filter: &str, overwrite: bool) -> Option<DatasetCase> {
    if target.exists() && !overwrite {
        debug!(target = %target.display(), "augmentation already present");
        return Some(DatasetCase::new(target));
    }
    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(src)
        .arg("-af")
        .arg(filter)
        .arg(target)
        .output();
    match status {
        Ok(output) if output.status.success() => Some(DatasetCase::new(target)),
        Ok(output) => {
            warn!(
                src = %src.display(),
                filter,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "ffmpeg filter failed"
            );
            None
        }
        Err(err) => {
            warn!(%err, "failed to launch ffmpeg");
            None
        }
    }
}

fn variant_path(case: &DatasetCase, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = case
        .path()
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    out_dir.join(format!("{stem}-{suffix}.wav"))
}

/// Produce every augmented variant of one recording.
pub fn augment_case(case: &DatasetCase, out_dir: &Path, overwrite: bool) -> Vec<DatasetCase> {
    let mut variants = Vec::new();
    let fixed: [(&str, String); 2] = [
        ("echo", "aecho=0.6:0.3:30:0.5".to_string()),
        ("reverb", "aecho=0.6:0.3:5:0.5".to_string()),
    ];
    for (suffix, filter) in fixed {
        let target = variant_path(case, out_dir, suffix);
        if let Some(variant) = ffmpeg_filter(case.path(), &target, &filter, overwrite) {
            variants.push(variant);
        }
    }
    for factor in PITCH_FACTORS {
        let suffix = format!("pitch{factor}");
        let filter = format!("rubberband=pitch={factor}");
        let target = variant_path(case, out_dir, &suffix);
        if let Some(variant) = ffmpeg_filter(case.path(), &target, &filter, overwrite) {
            variants.push(variant);
        }
    }
    variants
}

/// Write a manifest of `cases`, one row per recording, with paths relative to
/// the manifest's directory.
pub fn write_manifest(manifest: &Path, cases: &[DatasetCase]) -> Result<()> {
    let base = manifest.parent().unwrap_or_else(|| Path::new("."));
    let file = File::create(manifest)
        .with_context(|| format!("failed to create '{}'", manifest.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "wav_filename,wav_filesize,transcript")?;
    for case in cases {
        let relative = case.path().strip_prefix(base).unwrap_or(case.path());
        writeln!(
            out,
            "{},{},{}",
            relative.display(),
            case.size()?,
            case.phrase()
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Build the full dataset: originals into `test.csv`, augmented variants into
/// `train.csv`, both under `out_dir`.
pub fn build_dataset(input_dir: &Path, out_dir: &Path, overwrite: bool) -> Result<()> {
    let originals = collect_cases(input_dir)?;
    if originals.is_empty() {
        bail!("no recordings found in '{}'", input_dir.display());
    }

    let mut augmented = Vec::new();
    for case in &originals {
        augmented.extend(augment_case(case, out_dir, overwrite));
    }
    debug!(
        originals = originals.len(),
        augmented = augmented.len(),
        "dataset built"
    );

    write_manifest(&out_dir.join("test.csv"), &originals)?;
    write_manifest(&out_dir.join("train.csv"), &augmented)?;
    Ok(())
}
