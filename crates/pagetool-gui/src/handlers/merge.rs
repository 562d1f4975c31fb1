use pagetool_runtime::PageToolUpdate;
use pdf_pages::{PageRef, merge_pages};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_merge(
    pages: Vec<PageRef>,
    output_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) {
    let total = pages.len();
    let _ = update_tx.send(PageToolUpdate::Progress {
        operation: format!("Merging {total} pages"),
        current: 0,
        total,
    });

    match merge_pages(&pages, &output_path).await {
        Ok(summary) => {
            log::info!(
                "merged {} pages into {}",
                summary.page_count,
                summary.output.display()
            );
            let _ = update_tx.send(PageToolUpdate::MergeComplete {
                path: summary.output,
                page_count: summary.page_count,
            });
        }
        Err(e) => {
            log::error!("merge failed: {e}");
            let _ = update_tx.send(PageToolUpdate::Error {
                message: format!("Merge failed: {e}"),
            });
        }
    }
}
