use lopdf::{Document, Object, dictionary};
use pdf_pages::batch::{extract_document, optimize_document, rotate_document, split_document};
use pdf_pages::{BatchJob, BatchOperation, BatchStatus, CancelFlag, Rotation, run_batch};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_test_pdf(widths: &[i64]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for &width in widths {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
            "Resources" => dictionary! {},
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn write_pdf(dir: &TempDir, name: &str, widths: &[i64]) -> PathBuf {
    let path = dir.path().join(name);
    let mut writer = Vec::new();
    create_test_pdf(widths).save_to(&mut writer).unwrap();
    std::fs::write(&path, writer).unwrap();
    path
}

fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let dict = doc.get_dictionary(page_id).unwrap();
            dict.get(b"MediaBox").unwrap().as_array().unwrap()[2]
                .as_i64()
                .unwrap()
        })
        .collect()
}

#[test]
fn test_split_yields_single_page_files() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(&dir, "three.pdf", &[100, 200, 300]);

    let written = split_document(&source, dir.path()).unwrap();
    assert_eq!(written.len(), 3);
    for (i, path) in written.iter().enumerate() {
        assert_eq!(page_count(path), 1);
        assert_eq!(page_widths(path), vec![(i as i64 + 1) * 100]);
    }
}

#[test]
fn test_extract_preserves_given_order() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(&dir, "four.pdf", &[100, 200, 300, 400]);
    let output = dir.path().join("picked.pdf");

    extract_document(&source, &[2, 0], &output).unwrap();
    assert_eq!(page_widths(&output), vec![300, 100]);
}

#[test]
fn test_rotate_copy_applies_to_every_page() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(&dir, "two.pdf", &[100, 200]);
    let output = dir.path().join("rotated.pdf");

    rotate_document(&source, Rotation::Clockwise90, &output).unwrap();

    let doc = Document::load(&output).unwrap();
    for page_id in doc.get_pages().into_values() {
        let dict = doc.get_dictionary(page_id).unwrap();
        assert_eq!(dict.get(b"Rotate").and_then(|r| r.as_i64()).unwrap(), 90);
    }
    // Source untouched.
    assert_eq!(page_count(&source), 2);
}

#[test]
fn test_failed_write_leaves_no_partial_file() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(&dir, "one.pdf", &[100]);
    let output = dir.path().join("no_such_dir").join("rotated.pdf");

    assert!(rotate_document(&source, Rotation::Clockwise90, &output).is_err());
    assert!(!output.exists());
    assert!(!PathBuf::from(format!("{}.part", output.display())).exists());
}

#[test]
fn test_successful_write_removes_temp_file() {
    let dir = TempDir::new().unwrap();
    let source = write_pdf(&dir, "one.pdf", &[100]);
    let output = dir.path().join("rotated.pdf");

    rotate_document(&source, Rotation::Clockwise90, &output).unwrap();
    assert!(output.exists());
    assert!(!PathBuf::from(format!("{}.part", output.display())).exists());
}

#[test]
fn test_optimize_preserves_pages_and_drops_orphans() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("bloated.pdf");
    let mut doc = create_test_pdf(&[100, 200]);
    // An object nothing references, as left behind by sloppy writers.
    doc.add_object(dictionary! { "Leftover" => 1 });
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(&source, writer).unwrap();

    let output = dir.path().join("bloated_optimized.pdf");
    optimize_document(&source, &output).unwrap();

    assert_eq!(page_widths(&output), vec![100, 200]);
    let optimized = Document::load(&output).unwrap();
    let original = Document::load(&source).unwrap();
    assert!(optimized.objects.len() < original.objects.len());
}

#[tokio::test]
async fn test_optimize_batch_names_outputs() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(&dir, "a.pdf", &[100]);
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let job = BatchJob {
        files: vec![a],
        operation: BatchOperation::Optimize {
            output_dir: out_dir.clone(),
        },
    };
    let report = run_batch(&job, &CancelFlag::new(), |_, _, _| {})
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(page_count(&out_dir.join("a_optimized.pdf")), 1);
}

#[tokio::test]
async fn test_merge_all_concatenates_in_file_order() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(&dir, "a.pdf", &[100, 101]);
    let b = write_pdf(&dir, "b.pdf", &[200]);
    let output = dir.path().join("merged.pdf");

    let job = BatchJob {
        files: vec![a, b],
        operation: BatchOperation::MergeAll {
            output: output.clone(),
        },
    };
    let report = run_batch(&job, &CancelFlag::new(), |_, _, _| {})
        .await
        .unwrap();

    assert_eq!(report.status, BatchStatus::Completed);
    assert_eq!(report.succeeded, 2);
    assert_eq!(page_widths(&output), vec![100, 101, 200]);
}

#[tokio::test]
async fn test_per_file_failures_do_not_abort_batch() {
    let dir = TempDir::new().unwrap();
    let good = write_pdf(&dir, "good.pdf", &[100, 200]);
    let missing = dir.path().join("missing.pdf");

    let job = BatchJob {
        files: vec![missing.clone(), good],
        operation: BatchOperation::Split {
            output_dir: dir.path().to_owned(),
        },
    };
    let report = run_batch(&job, &CancelFlag::new(), |_, _, _| {})
        .await
        .unwrap();

    assert_eq!(report.status, BatchStatus::Completed);
    assert_eq!(report.processed, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, missing);
}

#[tokio::test]
async fn test_cancel_stops_before_further_work() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(&dir, "a.pdf", &[100]);
    let b = write_pdf(&dir, "b.pdf", &[200]);

    let cancel = CancelFlag::new();
    cancel.cancel();

    let job = BatchJob {
        files: vec![a, b],
        operation: BatchOperation::Split {
            output_dir: dir.path().to_owned(),
        },
    };
    let mut progress_calls = 0;
    let report = run_batch(&job, &cancel, |_, _, _| progress_calls += 1)
        .await
        .unwrap();

    assert_eq!(report.status, BatchStatus::Canceled);
    assert_eq!(report.processed, 0);
    assert_eq!(progress_calls, 0);
}
