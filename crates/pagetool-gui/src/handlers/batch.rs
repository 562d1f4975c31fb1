use pagetool_runtime::PageToolUpdate;
use pdf_pages::{BatchJob, CancelFlag, run_batch};
use tokio::sync::mpsc;

pub async fn handle_run(
    job: BatchJob,
    cancel: CancelFlag,
    update_tx: &mpsc::UnboundedSender<PageToolUpdate>,
) {
    let progress_tx = update_tx.clone();
    let result = run_batch(&job, &cancel, move |current, total, file| {
        let _ = progress_tx.send(PageToolUpdate::Progress {
            operation: format!("Processing {}", file.display()),
            current,
            total,
        });
    })
    .await;

    match result {
        Ok(report) => {
            log::info!(
                "batch finished: {}/{} files succeeded",
                report.succeeded,
                report.total
            );
            let _ = update_tx.send(PageToolUpdate::BatchFinished { report });
        }
        Err(e) => {
            log::error!("batch failed: {e}");
            let _ = update_tx.send(PageToolUpdate::Error {
                message: format!("Batch failed: {e}"),
            });
        }
    }
}
