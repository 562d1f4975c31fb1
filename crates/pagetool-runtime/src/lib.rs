use std::path::PathBuf;

// Re-export types from library crates
pub use pdf_pages::{
    BatchJob, BatchOperation, BatchReport, BatchStatus, CancelFlag, PageId, PageRef, Preferences,
    Rotation,
};
pub use pdf_thumbnails::DEFAULT_BASE_DPI;

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PageToolCommand {
    LoadSource {
        path: PathBuf,
    },
    RenderThumbnail {
        page: PageRef,
        target: (u32, u32),
    },
    /// Drop cached artifacts for a logical page (after a rotation change).
    InvalidatePage {
        id: PageId,
    },
    ApplySettings {
        prefs: Preferences,
    },
    Merge {
        pages: Vec<PageRef>,
        output_path: PathBuf,
    },
    /// Run a batch job; the flag is shared with the UI so the job can be
    /// canceled without queueing behind it.
    RunBatch {
        job: BatchJob,
        cancel: CancelFlag,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PageToolUpdate {
    SourceLoaded {
        path: PathBuf,
        page_count: usize,
    },
    SourceFailed {
        path: PathBuf,
        message: String,
    },
    ThumbnailReady {
        page: PageRef,
        artifact: PathBuf,
    },
    ThumbnailFailed {
        page: PageRef,
        message: String,
    },
    /// Sent once when the rasterization capability is absent; thumbnail
    /// features degrade to placeholders for the session.
    ThumbnailsUnavailable {
        message: String,
    },
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    MergeComplete {
        path: PathBuf,
        page_count: usize,
    },
    BatchFinished {
        report: BatchReport,
    },
    Error {
        message: String,
    },
}
