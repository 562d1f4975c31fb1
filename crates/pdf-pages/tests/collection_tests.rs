use pdf_pages::{ChangeKind, PageCollection, PageRef, PageToolError, Role, Rotation};
use std::sync::{Arc, Mutex};

fn page(source: &str, index: usize) -> PageRef {
    PageRef::new(source, index)
}

fn change_log(collection: &mut PageCollection) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    collection.subscribe(move |_, kind| {
        let tag = match kind {
            ChangeKind::Added(_) => "added",
            ChangeKind::Removed(_) => "removed",
            ChangeKind::Reordered { .. } => "reordered",
            ChangeKind::Rotated(_) => "rotated",
            ChangeKind::Cleared => "cleared",
        };
        sink.lock().unwrap().push(tag.to_string());
    });
    log
}

#[test]
fn test_roles() {
    assert_eq!(PageCollection::new_input().role(), Role::Input);
    assert_eq!(PageCollection::new_output().role(), Role::Output);
}

#[test]
fn test_from_source_builds_natural_order() {
    let collection = PageCollection::from_source("doc.pdf", 4);
    assert_eq!(collection.len(), 4);
    for (i, p) in collection.pages().iter().enumerate() {
        assert_eq!(p.id.page_index, i);
        assert_eq!(p.rotation, Rotation::None);
    }
}

#[test]
fn test_duplicate_append_rejected() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();

    let result = output.append(page("a.pdf", 0));
    assert!(matches!(result, Err(PageToolError::DuplicateInsert(_))));
    assert_eq!(output.len(), 1);
    assert_eq!(output.pages()[0].id.page_index, 0);
}

#[test]
fn test_duplicate_insert_rejected_regardless_of_rotation() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 1)).unwrap();

    let rotated = page("a.pdf", 1).with_rotation(Rotation::Clockwise90);
    assert!(output.insert(0, rotated).is_err());
    assert_eq!(output.len(), 1);
}

#[test]
fn test_remove_by_identity() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();
    output.append(page("a.pdf", 1)).unwrap();

    let removed = output.remove(&page("a.pdf", 0).id).unwrap();
    assert_eq!(removed.id.page_index, 0);
    assert_eq!(output.len(), 1);

    let missing = output.remove(&page("a.pdf", 7).id);
    assert!(matches!(missing, Err(PageToolError::NotFound(_))));
}

#[test]
fn test_move_inverse_law() {
    let mut output = PageCollection::new_output();
    for i in 0..5 {
        output.append(page("a.pdf", i)).unwrap();
    }
    let before: Vec<usize> = output.pages().iter().map(|p| p.id.page_index).collect();

    output.move_page(1, 3).unwrap();
    output.move_page(3, 1).unwrap();

    let after: Vec<usize> = output.pages().iter().map(|p| p.id.page_index).collect();
    assert_eq!(before, after);
}

#[test]
fn test_move_to_same_index_emits_nothing() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();
    output.append(page("a.pdf", 1)).unwrap();

    let log = change_log(&mut output);
    output.move_page(1, 1).unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_move_out_of_range() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();
    assert!(matches!(
        output.move_page(3, 0),
        Err(PageToolError::IndexOutOfRange(3))
    ));
}

#[test]
fn test_rotate_four_quarter_turns_restores_zero() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();

    let id = page("a.pdf", 0).id;
    for _ in 0..4 {
        output.rotate(&id, 90).unwrap();
    }
    assert_eq!(output.pages()[0].rotation, Rotation::None);
}

#[test]
fn test_rotate_rejected_on_input_role() {
    let mut input = PageCollection::from_source("a.pdf", 2);
    let id = input.pages()[0].id.clone();
    assert!(matches!(
        input.rotate(&id, 90),
        Err(PageToolError::InvalidRole(_))
    ));
}

#[test]
fn test_notifications_carry_change_kinds() {
    let mut output = PageCollection::new_output();
    let log = change_log(&mut output);

    output.append(page("a.pdf", 0)).unwrap();
    output.append(page("a.pdf", 1)).unwrap();
    output.move_page(0, 1).unwrap();
    output.rotate(&page("a.pdf", 1).id, 90).unwrap();
    output.remove(&page("a.pdf", 0).id).unwrap();
    output.clear();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["added", "added", "reordered", "rotated", "removed", "cleared"]
    );
}

#[test]
fn test_no_duplicates_after_mixed_operations() {
    let mut output = PageCollection::new_output();
    for i in 0..4 {
        output.append(page("a.pdf", i)).unwrap();
        output.append(page("b.pdf", i)).unwrap();
    }
    let _ = output.insert(2, page("a.pdf", 1));
    output.move_page(0, 5).unwrap();
    output.remove(&page("b.pdf", 2).id).unwrap();
    let _ = output.append(page("b.pdf", 0));
    output.move_page(4, 0).unwrap();

    let mut seen = std::collections::HashSet::new();
    for p in output.pages() {
        assert!(seen.insert(p.id.clone()), "duplicate identity: {}", p.id);
    }
}

#[test]
fn test_snapshot_is_detached() {
    let mut output = PageCollection::new_output();
    output.append(page("a.pdf", 0)).unwrap();
    let snapshot = output.snapshot();
    output.remove(&page("a.pdf", 0).id).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert!(output.is_empty());
}
