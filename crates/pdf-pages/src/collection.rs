//! Ordered page collections for the input and output areas.
//!
//! The output collection is the user-curated, duplicate-free sequence that
//! the final document is assembled from. Input collections mirror a source
//! file's natural page order and stay read-only apart from being populated
//! at load time. Structural changes are pushed to registered listeners; the
//! collection itself holds no rendering state.

use crate::types::{PageId, PageRef, PageToolError, Result, Rotation};

/// Which role a collection plays. Rotation is only exposed on the output
/// role; input page handles are never mutated before commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Input,
    Output,
}

/// Tag describing what a change notification is about.
#[derive(Debug, Clone)]
pub enum ChangeKind {
    Added(PageRef),
    Removed(PageRef),
    Reordered { from: usize, to: usize },
    Rotated(PageId),
    Cleared,
}

type Listener = Box<dyn Fn(&[PageRef], &ChangeKind) + Send>;

pub struct PageCollection {
    role: Role,
    pages: Vec<PageRef>,
    listeners: Vec<Listener>,
}

impl PageCollection {
    pub fn new_input() -> Self {
        Self::new(Role::Input)
    }

    pub fn new_output() -> Self {
        Self::new(Role::Output)
    }

    fn new(role: Role) -> Self {
        Self {
            role,
            pages: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Build an input collection for an opened source: one `PageRef` per
    /// page, rotation zero.
    pub fn from_source(source: impl Into<std::path::PathBuf>, page_count: usize) -> Self {
        let source = source.into();
        let mut collection = Self::new(Role::Input);
        collection.pages = (0..page_count)
            .map(|i| PageRef::new(source.clone(), i))
            .collect();
        collection
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    pub fn snapshot(&self) -> Vec<PageRef> {
        self.pages.clone()
    }

    pub fn get(&self, index: usize) -> Option<&PageRef> {
        self.pages.get(index)
    }

    pub fn index_of(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.same_page(id))
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.index_of(id).is_some()
    }

    /// Register a change listener. Every structural mutation invokes all
    /// listeners with the new snapshot and a [`ChangeKind`] tag.
    pub fn subscribe(&mut self, listener: impl Fn(&[PageRef], &ChangeKind) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&self, kind: ChangeKind) {
        for listener in &self.listeners {
            listener(&self.pages, &kind);
        }
    }

    /// Append a page. Rejects logical duplicates with `DuplicateInsert`.
    pub fn append(&mut self, page: PageRef) -> Result<()> {
        self.insert(self.pages.len(), page)
    }

    /// Insert a page at `index` (clamped to the current length). Rejects
    /// logical duplicates with `DuplicateInsert`.
    pub fn insert(&mut self, index: usize, page: PageRef) -> Result<()> {
        if self.contains(&page.id) {
            return Err(PageToolError::DuplicateInsert(page.id));
        }
        let index = index.min(self.pages.len());
        self.pages.insert(index, page.clone());
        self.notify(ChangeKind::Added(page));
        Ok(())
    }

    /// Remove the first page matching `id` by logical identity.
    pub fn remove(&mut self, id: &PageId) -> Result<PageRef> {
        let index = self
            .index_of(id)
            .ok_or_else(|| PageToolError::NotFound(id.clone()))?;
        let removed = self.pages.remove(index);
        self.notify(ChangeKind::Removed(removed.clone()));
        Ok(removed)
    }

    /// Relocate the page at `from` to `to`. Equal indices are a no-op and
    /// emit no notification.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.pages.len() {
            return Err(PageToolError::IndexOutOfRange(from));
        }
        let to = to.min(self.pages.len() - 1);
        if from == to {
            return Ok(());
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.notify(ChangeKind::Reordered { from, to });
        Ok(())
    }

    /// Rotate a page by `delta` degrees clockwise (multiple of 90, may be
    /// negative). Only valid on the output role; callers must invalidate any
    /// cached artifacts for the page afterwards.
    pub fn rotate(&mut self, id: &PageId, delta: i32) -> Result<Rotation> {
        if self.role != Role::Output {
            return Err(PageToolError::InvalidRole("input"));
        }
        let index = self
            .index_of(id)
            .ok_or_else(|| PageToolError::NotFound(id.clone()))?;
        let rotation = self.pages[index]
            .rotation
            .rotated_by(delta)
            .ok_or_else(|| PageToolError::Spec(format!("invalid rotation delta {delta}")))?;
        self.pages[index].rotation = rotation;
        self.notify(ChangeKind::Rotated(id.clone()));
        Ok(rotation)
    }

    pub fn clear(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        self.pages.clear();
        self.notify(ChangeKind::Cleared);
    }
}

impl std::fmt::Debug for PageCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCollection")
            .field("role", &self.role)
            .field("pages", &self.pages)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
