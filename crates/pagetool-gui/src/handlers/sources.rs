use pagetool_runtime::PageToolUpdate;
use pdf_pages::load_source;
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_load(path: PathBuf, update_tx: &mpsc::UnboundedSender<PageToolUpdate>) {
    match load_source(&path).await {
        Ok(info) => {
            log::info!("loaded {} ({} pages)", info.path.display(), info.page_count);
            let _ = update_tx.send(PageToolUpdate::SourceLoaded {
                path: info.path,
                page_count: info.page_count,
            });
        }
        Err(e) => {
            log::error!("failed to load {}: {e}", path.display());
            let _ = update_tx.send(PageToolUpdate::SourceFailed {
                path,
                message: e.to_string(),
            });
        }
    }
}
