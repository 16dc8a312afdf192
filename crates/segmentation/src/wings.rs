//! Randomized A/B wing splitting.

use crate::io::write_csv;
use crate::prospects::{CrmProspect, SladerRecord, CRM_PROPERTIES};
use launch_core::LaunchResult;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_WINGS: usize = 2;

/// Split `items` into `wings` contiguous parts whose sizes differ by at
/// most one; the first `len % wings` parts get the extra item.
pub fn split_into_wings<T>(items: Vec<T>, wings: usize) -> Vec<Vec<T>> {
    if wings == 0 {
        return Vec::new();
    }
    let base = items.len() / wings;
    let extra = items.len() % wings;
    let mut rest = items.into_iter();
    (0..wings)
        .map(|i| {
            let size = base + usize::from(i < extra);
            rest.by_ref().take(size).collect()
        })
        .collect()
}

/// Shuffle, then split. Every item lands in exactly one wing.
pub fn shuffle_and_split<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    wings: usize,
    rng: &mut R,
) -> Vec<Vec<T>> {
    items.shuffle(rng);
    split_into_wings(items, wings)
}

/// `A`, `B`, ... for the first 26 wings, then the 1-based index.
pub fn wing_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

pub fn wing_file_name(segment: &str, index: usize) -> String {
    format!("{segment}_wing_{}.csv", wing_label(index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WingFile {
    pub label: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Read a member export, infer CRM rows for `segment`, shuffle them into
/// `wings` wings and write one CRM-importable CSV per wing to `out_dir`.
pub fn write_wing_files<R: Rng + ?Sized>(
    input: &Path,
    segment: &str,
    out_dir: &Path,
    wings: usize,
    rng: &mut R,
) -> LaunchResult<Vec<WingFile>> {
    let records: Vec<SladerRecord> = crate::io::read_csv(input)?;
    let prospects: Vec<CrmProspect> = records
        .iter()
        .map(|r| CrmProspect::from_slader(r, segment))
        .collect();
    info!(segment, prospects = prospects.len(), wings, "Splitting segment into wings");

    std::fs::create_dir_all(out_dir)?;
    let mut files = Vec::with_capacity(wings);
    for (index, wing) in shuffle_and_split(prospects, wings, rng).into_iter().enumerate() {
        let path = out_dir.join(wing_file_name(segment, index));
        write_csv(&path, &CRM_PROPERTIES, &wing)?;
        info!(path = %path.display(), rows = wing.len(), "Wing written");
        files.push(WingFile {
            label: wing_label(index),
            path,
            rows: wing.len(),
        });
    }
    Ok(files)
}
