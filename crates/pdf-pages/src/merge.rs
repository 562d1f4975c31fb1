//! Source loading and output assembly.
//!
//! A merge consumes a snapshot of the output collection and writes exactly
//! one file: each distinct source document is loaded once, its objects are
//! imported into a fresh document, the selected pages are re-parented onto a
//! new root page tree in collection order with their rotations applied, and
//! everything left unreachable (old catalogs and page trees, unselected
//! pages) is pruned before saving. The output is written to a sibling temp
//! file and renamed into place so a failed merge never leaves a partial file
//! behind.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::{PageId, PageRef, PageToolError, Result, Rotation};

/// What the loader learned about an opened source file.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Canonicalized path; used as the page identity's source id.
    pub path: PathBuf,
    pub page_count: usize,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub page_count: usize,
}

/// Open a source file and report its canonical path and page count.
pub async fn load_source(path: impl AsRef<Path>) -> Result<SourceInfo> {
    let path = path.as_ref().to_owned();
    let canonical = path
        .canonicalize()
        .map_err(|e| PageToolError::SourceUnreadable {
            path: path.clone(),
            source: e,
        })?;
    let doc = {
        let canonical = canonical.clone();
        tokio::task::spawn_blocking(move || load_document(&canonical)).await??
    };
    Ok(SourceInfo {
        path: canonical,
        page_count: doc.get_pages().len(),
    })
}

/// Load a document synchronously, mapping file-system failures to
/// `SourceUnreadable`.
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path).map_err(|e| PageToolError::SourceUnreadable {
        path: path.to_owned(),
        source: e,
    })?;
    Ok(Document::load_mem(&bytes)?)
}

/// Assemble the pages into one output PDF at `output`.
pub async fn merge_pages(pages: &[PageRef], output: impl AsRef<Path>) -> Result<MergeSummary> {
    let pages = pages.to_vec();
    let output = output.as_ref().to_owned();

    let mut merged = tokio::task::spawn_blocking({
        let pages = pages.clone();
        move || merge_sync(&pages)
    })
    .await??;

    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        merged.save_to(&mut writer)?;
        Ok::<_, PageToolError>(writer)
    })
    .await??;

    write_atomically(&output, &bytes).await?;
    Ok(MergeSummary {
        output,
        page_count: pages.len(),
    })
}

/// Write via a sibling temp file and rename, removing the temp file if any
/// step fails.
async fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = output.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, output).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

pub(crate) fn merge_sync(pages: &[PageRef]) -> Result<Document> {
    if pages.is_empty() {
        return Err(PageToolError::NoPages);
    }

    let mut merged = Document::with_version("1.7");
    let pages_root_id = merged.new_object_id();

    // Import each distinct source once, in first-appearance order, and map
    // its page indices to object ids in the merged id space.
    let mut imported: HashMap<PathBuf, Vec<ObjectId>> = HashMap::new();
    for page in pages {
        if imported.contains_key(&page.id.source) {
            continue;
        }
        let mut doc = load_document(&page.id.source).map_err(|e| merge_failed(&page.id, e))?;
        doc.renumber_objects_with(merged.max_id + 1);
        merged.max_id = doc.max_id;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        merged.objects.extend(doc.objects);
        imported.insert(page.id.source.clone(), page_ids);
    }

    // Validate every index before touching the output tree.
    for page in pages {
        let source_pages = &imported[&page.id.source];
        if page.id.page_index >= source_pages.len() {
            return Err(merge_failed(
                &page.id,
                PageToolError::PageNotFound {
                    path: page.id.source.clone(),
                    page_index: page.id.page_index,
                    page_count: source_pages.len(),
                },
            ));
        }
    }

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = imported[&page.id.source][page.id.page_index];
        inline_inherited_attributes(&mut merged, page_id).map_err(|e| merge_failed(&page.id, e))?;
        let dict = merged
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| merge_failed(&page.id, e.into()))?;
        dict.set("Parent", Object::Reference(pages_root_id));
        apply_rotation(dict, page.rotation);
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    merged.objects.insert(
        pages_root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_root_id,
    });
    merged.trailer.set("Root", catalog_id);

    // The imported documents brought along their full object sets; once the
    // selected pages hang off the new root, everything else (old catalogs,
    // old page trees, unselected pages and their streams) is unreachable.
    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

/// Attributes a page may inherit from its `Pages` ancestors (PDF 32000-1
/// table 30). The source page tree does not survive the merge, so inherited
/// values are materialized on the page dictionary itself.
const INHERITED_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

fn inline_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut found: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_object(page_id)?.as_dict()?;
        for key in INHERITED_PAGE_KEYS {
            if page.has(key) {
                continue;
            }
            let mut ancestor = page.get(b"Parent").and_then(Object::as_reference).ok();
            while let Some(id) = ancestor {
                let Ok(dict) = doc.get_object(id).and_then(Object::as_dict) else {
                    break;
                };
                if let Ok(value) = dict.get(key) {
                    found.push((key, value.clone()));
                    break;
                }
                ancestor = dict.get(b"Parent").and_then(Object::as_reference).ok();
            }
        }
    }
    if !found.is_empty() {
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in found {
            page.set(key, value);
        }
    }
    Ok(())
}

/// Set the page's `/Rotate` to the as-stored value plus the ref's rotation.
/// The ref's rotation is the total desired turn relative to the page as it
/// was stored at load time; refs always start at zero on a fresh load.
fn apply_rotation(dict: &mut lopdf::Dictionary, rotation: Rotation) {
    let degrees = rotation.degrees() as i64;
    if degrees == 0 {
        return;
    }
    let stored = dict.get(b"Rotate").and_then(|r| r.as_i64()).unwrap_or(0);
    dict.set("Rotate", Object::Integer((stored + degrees).rem_euclid(360)));
}

fn merge_failed(page: &PageId, error: PageToolError) -> PageToolError {
    match error {
        e @ PageToolError::MergeFailed { .. } => e,
        e => PageToolError::MergeFailed {
            reason: e.to_string(),
            page: page.clone(),
        },
    }
}
