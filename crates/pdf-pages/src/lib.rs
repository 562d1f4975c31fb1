pub mod batch;
mod cancel;
mod collection;
mod merge;
pub mod reorder;
mod settings;
mod types;

pub use batch::{BatchJob, BatchOperation, BatchReport, BatchStatus, run_batch};
pub use cancel::CancelFlag;
pub use collection::{ChangeKind, PageCollection, Role};
pub use merge::{MergeSummary, SourceInfo, load_source, merge_pages};
pub use reorder::{DragPayload, DropOutcome, DropRejection, Point, insertion_index, resolve_drop};
pub use settings::Preferences;
pub use types::*;
