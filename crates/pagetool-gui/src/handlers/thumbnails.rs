use pagetool_runtime::PageToolUpdate;
use pdf_pages::{PageRef, Preferences};
use pdf_thumbnails::ThumbnailCache;
use tokio::sync::mpsc;

pub async fn handle_render(
    page: PageRef,
    target: (u32, u32),
    cache: &mut ThumbnailCache,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) {
    if !cache.has_backend() {
        // Degraded mode: serve a stale artifact for the page if one exists,
        // otherwise stay silent and let the UI keep its placeholder.
        if let Some(artifact) = cache.lookup_any(&page.id) {
            let _ = update_tx.send(PageToolUpdate::ThumbnailReady { page, artifact });
        }
        return;
    }

    // Rendering binds pdfium and touches disk; keep the runtime responsive.
    let result = tokio::task::block_in_place(|| cache.get_or_render(&page, target));
    match result {
        Ok(artifact) => {
            let _ = update_tx.send(PageToolUpdate::ThumbnailReady { page, artifact });
        }
        Err(e) => {
            log::warn!("thumbnail render failed for {}: {e}", page.id);
            let _ = update_tx.send(PageToolUpdate::ThumbnailFailed {
                page,
                message: e.to_string(),
            });
        }
    }
}

pub fn handle_apply_settings(prefs: &Preferences, cache: &mut ThumbnailCache) {
    cache.set_budget(prefs.cache_budget_bytes());
    log::info!("applied settings: {} MB cache", prefs.cache_size_mb);
}
