//! Drop resolution for the output area.
//!
//! A drag gesture ends with a payload and a drop point; this module turns
//! those into an insert or move against the output collection. It is a pure
//! function of (collection snapshot, payload, drop geometry) and keeps no
//! state between calls, so the reordering rules stay independently testable.

use std::path::PathBuf;

use crate::collection::PageCollection;
use crate::types::{PageId, PageRef, PageToolError};

/// A point in the output view's layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Typed drag payload, validated at the boundary instead of string-parsed
/// in the drop handler.
#[derive(Debug, Clone)]
pub enum DragPayload {
    /// A page already known to the session, dragged from the input or the
    /// output area.
    ExistingPage(PageRef),
    /// Files dragged in from outside the application. Not handled here;
    /// the window boundary forwards these to the file-open path.
    ExternalFiles(Vec<PathBuf>),
}

/// What a resolved drop did to the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Inserted { index: usize },
    Moved { from: usize, to: usize },
    /// Existing page dropped back onto its own position; the collection is
    /// untouched and no notification fired.
    NoOp,
    Rejected(DropRejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropRejection {
    /// Payload identity already present when treated as a fresh insert.
    Duplicate(PageId),
    /// External file payloads are delegated to the file-open collaborator.
    ExternalFiles(Vec<PathBuf>),
}

/// Nearest-widget insertion: find the rendered widget whose center is
/// closest to the drop point; dropping right of that center inserts after
/// it. `centers` must list the widget centers in collection order.
pub fn insertion_index(drop: Point, centers: &[Point]) -> usize {
    if centers.is_empty() {
        return 0;
    }

    let mut closest = 0;
    let mut min_distance = f32::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let distance = drop.distance_to(*center);
        if distance < min_distance {
            min_distance = distance;
            closest = i;
        }
    }

    let index = if drop.x > centers[closest].x {
        closest + 1
    } else {
        closest
    };
    index.min(centers.len())
}

/// Resolve one drop gesture against the output collection.
///
/// An existing-page payload whose identity is already in the collection is
/// a move; removing it first shifts later indices left, so a target past
/// the current position is decremented by one before comparing. Anything
/// not yet in the collection is a fresh insert at the computed index.
pub fn resolve_drop(
    collection: &mut PageCollection,
    payload: DragPayload,
    drop: Point,
    centers: &[Point],
) -> DropOutcome {
    let page = match payload {
        DragPayload::ExistingPage(page) => page,
        DragPayload::ExternalFiles(paths) => {
            return DropOutcome::Rejected(DropRejection::ExternalFiles(paths));
        }
    };

    let target = insertion_index(drop, centers).min(collection.len());

    if let Some(existing) = collection.index_of(&page.id) {
        let adjusted = if existing < target { target - 1 } else { target };
        if adjusted == existing {
            return DropOutcome::NoOp;
        }
        // existing is a valid index, so the move cannot fail
        let _ = collection.move_page(existing, adjusted);
        DropOutcome::Moved {
            from: existing,
            to: adjusted,
        }
    } else {
        match collection.insert(target, page) {
            Ok(()) => DropOutcome::Inserted { index: target },
            Err(PageToolError::DuplicateInsert(id)) => {
                DropOutcome::Rejected(DropRejection::Duplicate(id))
            }
            Err(_) => unreachable!("insert only fails on duplicates"),
        }
    }
}
