use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageToolError {
    #[error("source not readable: {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("page {page_index} not found in {path} ({page_count} pages)")]
    PageNotFound {
        path: PathBuf,
        page_index: usize,
        page_count: usize,
    },
    #[error("page already present in output: {0}")]
    DuplicateInsert(PageId),
    #[error("page not in collection: {0}")]
    NotFound(PageId),
    #[error("operation not valid for {0} collections")]
    InvalidRole(&'static str),
    #[error("merge failed at {page}: {reason}")]
    MergeFailed { reason: String, page: PageId },
    #[error("no pages to merge")]
    NoPages,
    #[error("index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("invalid page spec: {0}")]
    Spec(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PageToolError>;

/// Clockwise page rotation, in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize an angle in degrees to a rotation. Angles are taken
    /// modulo 360 and must land on a quarter turn.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Clockwise90),
            180 => Some(Rotation::Clockwise180),
            270 => Some(Rotation::Clockwise270),
            _ => None,
        }
    }

    /// Additive rotation: `delta` degrees clockwise on top of the current
    /// value, modulo 360. Negative deltas rotate counter-clockwise.
    pub fn rotated_by(self, delta: i32) -> Option<Self> {
        Self::from_degrees(self.degrees() + delta)
    }
}

/// Logical identity of one page within one source document.
///
/// Two `PageId`s compare equal iff they name the same source file and page
/// index; rotation is deliberately not part of identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId {
    pub source: PathBuf,
    pub page_index: usize,
}

impl PageId {
    pub fn new(source: impl Into<PathBuf>, page_index: usize) -> Self {
        Self {
            source: source.into(),
            page_index,
        }
    }

    /// Stem of the source file name, used for deterministic artifact names.
    pub fn source_stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string())
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page {} of {}",
            self.page_index + 1,
            self.source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.source.display().to_string())
        )
    }
}

/// One logical page plus its current rotation state.
///
/// Equality is intentionally not derived: identity comparisons go through
/// [`PageId`], while rotation only matters for rendered artifacts.
#[derive(Debug, Clone)]
pub struct PageRef {
    pub id: PageId,
    pub rotation: Rotation,
}

impl PageRef {
    pub fn new(source: impl Into<PathBuf>, page_index: usize) -> Self {
        Self {
            id: PageId::new(source, page_index),
            rotation: Rotation::None,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn same_page(&self, other: &PageId) -> bool {
        self.id == *other
    }
}
