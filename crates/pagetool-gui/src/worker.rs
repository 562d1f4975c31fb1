use pagetool_runtime::{PageToolCommand, PageToolUpdate};
use pdf_pages::{PageRef, Preferences};
use pdf_thumbnails::ThumbnailCache;
use tokio::sync::mpsc;

use crate::handlers;

/// Async worker task that processes commands and sends updates. Owns the
/// thumbnail cache for the whole session.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PageToolCommand>,
    update_tx: mpsc::UnboundedSender<PageToolUpdate>,
) {
    let mut cache = match build_cache(&Preferences::default(), &update_tx) {
        Ok(cache) => Some(cache),
        Err(e) => {
            let _ = update_tx.send(PageToolUpdate::Error {
                message: format!("Thumbnail storage unavailable: {e}"),
            });
            None
        }
    };

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut cache, &mut command_rx, &update_tx).await;
    }

    // UI side hung up; remove the session's rendered artifacts.
    if let Some(cache) = cache {
        cache.shutdown();
    }
}

#[cfg(feature = "thumbnails")]
fn build_cache(
    prefs: &Preferences,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) -> pdf_thumbnails::Result<ThumbnailCache> {
    match crate::backend::init_pdfium() {
        // Thumbnails always rasterize at the fixed base DPI; preferences
        // only size the artifact and the cache budget.
        Ok(_) => ThumbnailCache::new(
            Box::new(crate::backend::PdfiumBackend),
            pagetool_runtime::DEFAULT_BASE_DPI,
            prefs.cache_budget_bytes(),
        ),
        Err(e) => {
            log::warn!("pdfium unavailable, thumbnails degrade to placeholders: {e}");
            let _ = update_tx.send(PageToolUpdate::ThumbnailsUnavailable {
                message: e.to_string(),
            });
            ThumbnailCache::without_backend(prefs.cache_budget_bytes())
        }
    }
}

#[cfg(not(feature = "thumbnails"))]
fn build_cache(
    prefs: &Preferences,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) -> pdf_thumbnails::Result<ThumbnailCache> {
    let _ = update_tx.send(PageToolUpdate::ThumbnailsUnavailable {
        message: "built without thumbnail support".to_string(),
    });
    ThumbnailCache::without_backend(prefs.cache_budget_bytes())
}

async fn process_command(
    cmd: PageToolCommand,
    cache: &mut Option<ThumbnailCache>,
    command_rx: &mut mpsc::UnboundedReceiver<PageToolCommand>,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) {
    match cmd {
        PageToolCommand::LoadSource { path } => {
            handlers::sources::handle_load(path, update_tx).await;
        }
        PageToolCommand::RenderThumbnail { page, target } => {
            // Drain queued render requests into one batch, discarding exact
            // duplicates; the UI re-requests every frame while waiting.
            let mut batch: Vec<(PageRef, (u32, u32))> = vec![(page, target)];
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let PageToolCommand::RenderThumbnail { page, target } = next_cmd {
                    let duplicate = batch.iter().any(|(queued, queued_target)| {
                        queued.same_page(&page.id)
                            && queued.rotation == page.rotation
                            && *queued_target == target
                    });
                    if duplicate {
                        log::debug!("discarding duplicate thumbnail request for {}", page.id);
                    } else {
                        batch.push((page, target));
                    }
                } else {
                    // Non-render command found; process it before the batch
                    Box::pin(process_command(next_cmd, cache, command_rx, update_tx)).await;
                }
            }

            for (page, target) in batch {
                match cache {
                    Some(cache) => {
                        handlers::thumbnails::handle_render(page, target, cache, update_tx).await;
                    }
                    None => {
                        let _ = update_tx.send(PageToolUpdate::ThumbnailFailed {
                            page,
                            message: "thumbnail storage unavailable".to_string(),
                        });
                    }
                }
            }
        }
        PageToolCommand::InvalidatePage { id } => {
            if let Some(cache) = cache {
                cache.invalidate(&id);
            }
        }
        PageToolCommand::ApplySettings { prefs } => {
            if let Some(cache) = cache {
                handlers::thumbnails::handle_apply_settings(&prefs, cache);
            }
        }
        PageToolCommand::Merge { pages, output_path } => {
            handlers::merge::handle_merge(pages, output_path, update_tx).await;
        }
        PageToolCommand::RunBatch { job, cancel } => {
            handlers::batch::handle_run(job, cancel, update_tx).await;
        }
    }
}
