//! Batch operations over a list of source files.
//!
//! Each operation writes new files and never mutates its sources. Per-file
//! failures are collected into the report instead of aborting the batch;
//! cancellation is checked between per-file units of work.

use std::path::{Path, PathBuf};

use crate::cancel::CancelFlag;
use crate::collection::PageCollection;
use crate::merge::{load_document, merge_pages, merge_sync};
use crate::types::{PageRef, PageToolError, Result, Rotation};

#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Concatenate every page of every file, in order, into one output.
    MergeAll { output: PathBuf },
    /// Write each page of each file as its own single-page PDF.
    Split { output_dir: PathBuf },
    /// Write a copy of each file with every page rotated by `rotation`.
    RotateAll {
        rotation: Rotation,
        output_dir: PathBuf,
    },
    /// Write a copy of each file containing only the given zero-based pages.
    Extract {
        page_indices: Vec<usize>,
        output_dir: PathBuf,
    },
    /// Re-save each file with streams compressed and unreferenced objects
    /// dropped.
    Optimize { output_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub files: Vec<PathBuf>,
    pub operation: BatchOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    Canceled,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    /// Per-file failures, surfaced as a summary rather than aborting.
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            status: BatchStatus::Completed,
            total,
            processed: 0,
            succeeded: 0,
            failures: Vec::new(),
        }
    }
}

/// Run a batch job. `progress` is invoked before each per-file unit with
/// (current, total, file); a canceled job stops reporting immediately and
/// finishes with `BatchStatus::Canceled`.
pub async fn run_batch(
    job: &BatchJob,
    cancel: &CancelFlag,
    mut progress: impl FnMut(usize, usize, &Path),
) -> Result<BatchReport> {
    // Merge-all consumes the whole file list as one collection.
    if let BatchOperation::MergeAll { output } = &job.operation {
        return merge_all(&job.files, output, cancel, progress).await;
    }

    let mut report = BatchReport::new(job.files.len());
    for (i, file) in job.files.iter().enumerate() {
        if cancel.is_canceled() {
            report.status = BatchStatus::Canceled;
            return Ok(report);
        }
        progress(i + 1, job.files.len(), file);

        let result = match &job.operation {
            BatchOperation::Split { output_dir } => {
                let file = file.clone();
                let dir = output_dir.clone();
                tokio::task::spawn_blocking(move || split_document(&file, &dir).map(|_| ()))
                    .await?
            }
            BatchOperation::RotateAll {
                rotation,
                output_dir,
            } => {
                let file = file.clone();
                let out = output_dir.join(derived_name(&file, "rotated"));
                let rotation = *rotation;
                tokio::task::spawn_blocking(move || rotate_document(&file, rotation, &out)).await?
            }
            BatchOperation::Extract {
                page_indices,
                output_dir,
            } => {
                let file = file.clone();
                let out = output_dir.join(derived_name(&file, "extracted"));
                let indices = page_indices.clone();
                tokio::task::spawn_blocking(move || extract_document(&file, &indices, &out))
                    .await?
            }
            BatchOperation::Optimize { output_dir } => {
                let file = file.clone();
                let out = output_dir.join(derived_name(&file, "optimized"));
                tokio::task::spawn_blocking(move || optimize_document(&file, &out)).await?
            }
            BatchOperation::MergeAll { .. } => unreachable!(),
        };

        report.processed += 1;
        match result {
            Ok(()) => report.succeeded += 1,
            Err(e) => report.failures.push((file.clone(), e.to_string())),
        }
    }
    Ok(report)
}

async fn merge_all(
    files: &[PathBuf],
    output: &Path,
    cancel: &CancelFlag,
    mut progress: impl FnMut(usize, usize, &Path),
) -> Result<BatchReport> {
    let mut report = BatchReport::new(files.len());
    let mut collection = PageCollection::new_output();

    for (i, file) in files.iter().enumerate() {
        if cancel.is_canceled() {
            report.status = BatchStatus::Canceled;
            return Ok(report);
        }
        progress(i + 1, files.len(), file);

        match crate::merge::load_source(file).await {
            Ok(info) => {
                for index in 0..info.page_count {
                    // A file listed twice only contributes its pages once.
                    let _ = collection.append(PageRef::new(info.path.clone(), index));
                }
                report.processed += 1;
                report.succeeded += 1;
            }
            Err(e) => {
                report.processed += 1;
                report.failures.push((file.clone(), e.to_string()));
            }
        }
    }

    if collection.is_empty() {
        return Err(PageToolError::NoPages);
    }
    merge_pages(collection.pages(), output).await?;
    Ok(report)
}

/// Split one document into single-page files named `{stem}_page_{n}.pdf`.
/// Returns the paths written.
pub fn split_document(path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let page_count = load_document(path)?.get_pages().len();
    let stem = PageRef::new(path, 0).id.source_stem();

    let mut written = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let out = output_dir.join(format!("{}_page_{}.pdf", stem, index + 1));
        save_document(merge_sync(&[PageRef::new(path, index)])?, &out)?;
        written.push(out);
    }
    Ok(written)
}

/// Write a copy of `path` with every page rotated by `rotation`.
pub fn rotate_document(path: &Path, rotation: Rotation, output: &Path) -> Result<()> {
    let page_count = load_document(path)?.get_pages().len();
    let pages: Vec<PageRef> = (0..page_count)
        .map(|i| PageRef::new(path, i).with_rotation(rotation))
        .collect();
    save_document(merge_sync(&pages)?, output)
}

/// Write a copy of `path` containing only the given zero-based pages, in
/// the order given.
pub fn extract_document(path: &Path, page_indices: &[usize], output: &Path) -> Result<()> {
    let pages: Vec<PageRef> = page_indices
        .iter()
        .map(|&i| PageRef::new(path, i))
        .collect();
    save_document(merge_sync(&pages)?, output)
}

/// Re-save `path` with streams compressed and objects nothing references
/// removed. Often shrinks files written by tools that never clean up after
/// themselves.
pub fn optimize_document(path: &Path, output: &Path) -> Result<()> {
    let mut doc = load_document(path)?;
    doc.prune_objects();
    doc.compress();
    save_document(doc, output)
}

/// Write via a sibling temp file and rename, removing the temp file if any
/// step fails. Blocking counterpart of the merge writer.
fn save_document(mut doc: lopdf::Document, output: &Path) -> Result<()> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;

    let mut tmp = output.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = std::fs::write(&tmp, &writer) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&tmp, output) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn derived_name(path: &Path, suffix: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}_{suffix}.pdf")
}
