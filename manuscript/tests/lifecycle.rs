//! Multi-step scenarios over a real chapters directory.
//!
//! Each test drives several operations in sequence and checks that the
//! store stays contiguous and that chapter content follows its chapter
//! through renumbering.

use std::fs;

use manuscript::ChapterError;
use manuscript::core::invariants::check_contiguity;
use manuscript::core::types::{BumpKind, Version};
use manuscript::io::bump::{bump_all, bump_chapter};
use manuscript::io::check::check_store;
use manuscript::io::lifecycle::{create_chapter, delete_chapter, insert_chapter};
use manuscript::io::reorder::reorder;
use manuscript::io::store::{chapter_numbers, list_chapters, read_latest};
use manuscript::test_support::{BookFixture, body};

fn assert_contiguous(book: &BookFixture) {
    let numbers = chapter_numbers(book.chapters_dir()).expect("numbers");
    let problems = check_contiguity(&numbers);
    assert!(problems.is_empty(), "not contiguous: {problems:?}");
}

/// Create and delete in an interleaved sequence; numbering stays `1..N`.
#[test]
fn create_delete_sequence_stays_contiguous() {
    let book = BookFixture::new().expect("fixture");
    let root = book.chapters_dir();

    for _ in 0..4 {
        create_chapter(root).expect("create");
        assert_contiguous(&book);
    }
    delete_chapter(root, 2).expect("delete 2");
    assert_contiguous(&book);
    create_chapter(root).expect("create");
    delete_chapter(root, 1).expect("delete 1");
    assert_contiguous(&book);
    delete_chapter(root, 3).expect("delete last");
    assert_contiguous(&book);

    assert_eq!(chapter_numbers(root).expect("numbers"), vec![1, 2]);
    assert!(check_store(root).expect("check").is_healthy());
}

/// Deleting chapter 2 of 4: old 3 becomes 2, old 4 becomes 3.
#[test]
fn delete_moves_later_content_down() {
    let book = BookFixture::with_chapters(4).expect("fixture");
    let root = book.chapters_dir();

    delete_chapter(root, 2).expect("delete");

    assert_eq!(chapter_numbers(root).expect("numbers"), vec![1, 2, 3]);
    assert_eq!(book.latest_contents(1).expect("1"), body(1));
    assert_eq!(book.latest_contents(2).expect("2"), body(3));
    assert_eq!(book.latest_contents(3).expect("3"), body(4));
}

/// Applying a permutation and then its inverse restores every chapter.
#[test]
fn reorder_then_inverse_restores_original() {
    let book = BookFixture::with_chapters(5).expect("fixture");
    let root = book.chapters_dir();
    let order = [3, 5, 1, 2, 4];

    reorder(root, &order).expect("reorder");
    for (index, &old) in order.iter().enumerate() {
        let position = index as u32 + 1;
        assert_eq!(book.latest_contents(position).expect("content"), body(old));
    }

    // Old chapter `order[i]` now sits at `i + 1`; invert that mapping.
    let mut inverse = [0u32; 5];
    for (index, &old) in order.iter().enumerate() {
        inverse[old as usize - 1] = index as u32 + 1;
    }
    reorder(root, &inverse).expect("reorder back");

    for num in 1..=5 {
        assert_eq!(book.latest_contents(num).expect("content"), body(num));
    }
    assert_eq!(
        book.entry_names().expect("entries"),
        vec!["Chapter 1", "Chapter 2", "Chapter 3", "Chapter 4", "Chapter 5"]
    );
}

/// A failed reorder leaves every directory where it was.
#[test]
fn rejected_reorder_changes_nothing() {
    let book = BookFixture::with_chapters(3).expect("fixture");
    let root = book.chapters_dir();
    let before = book.entry_names().expect("entries");

    let err = reorder(root, &[2, 2, 1]).expect_err("duplicate");
    assert!(matches!(err, ChapterError::InvalidOrder(_)));
    let err = reorder(root, &[1, 2, 9]).expect_err("unknown");
    assert!(matches!(err, ChapterError::NotFound(_)));

    assert_eq!(book.entry_names().expect("entries"), before);
    for num in 1..=3 {
        assert_eq!(book.latest_contents(num).expect("content"), body(num));
    }
}

/// Bumps copy content byte-for-byte and versions only increase.
#[test]
fn repeated_bumps_are_monotonic_and_faithful() {
    let book = BookFixture::new().expect("fixture");
    let root = book.chapters_dir();
    let text = "# Opening\n\nUnicode — “quotes” and trailing spaces   \n";
    book.add_chapter(1, text).expect("chapter");

    let mut previous = Version::INITIAL;
    for kind in [
        BumpKind::Patch,
        BumpKind::Minor,
        BumpKind::Patch,
        BumpKind::Major,
    ] {
        let bumped = bump_chapter(root, 1, kind).expect("bump");
        assert!(bumped.current > previous);
        assert_eq!(bumped.previous, previous);
        assert_eq!(fs::read_to_string(&bumped.markdown).expect("copy"), text);
        previous = bumped.current;
    }

    let (latest, markdown, contents) = read_latest(root, 1).expect("latest");
    assert_eq!(latest, Version::new(2, 0, 0));
    assert_eq!(contents, text);
    assert_eq!(
        markdown.file_name().and_then(|name| name.to_str()),
        Some("chapter.md")
    );
}

/// Insert, bump, reorder, delete: the listing tracks every step.
#[test]
fn mixed_operations_keep_listing_consistent() {
    let book = BookFixture::with_chapters(3).expect("fixture");
    let root = book.chapters_dir();

    insert_chapter(root, 2).expect("insert");
    assert_contiguous(&book);
    assert_eq!(book.latest_contents(3).expect("shifted"), body(2));

    let report = bump_all(root, BumpKind::Minor).expect("bump all");
    assert!(report.is_complete_success());
    assert_eq!(report.succeeded(), 4);

    reorder(root, &[4, 3, 2, 1]).expect("reverse");
    delete_chapter(root, 4).expect("delete");
    assert_contiguous(&book);

    let listing = list_chapters(root).expect("list");
    let numbers: Vec<u32> = listing.iter().map(|entry| entry.chapter).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(
        listing
            .iter()
            .all(|entry| entry.version == Version::new(1, 1, 0))
    );
    assert_eq!(book.latest_contents(1).expect("1"), body(3));
    assert_eq!(book.latest_contents(2).expect("2"), body(2));
    assert!(
        book.latest_contents(3)
            .expect("3")
            .starts_with("# Chapter 2")
    );
}
