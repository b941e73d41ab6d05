use std::fs;
use std::path::Path;

use tempfile::TempDir;

use titools_core::catalog::{BLOCK_END, BLOCK_START};
use titools_core::knowledge::{add_or_update_block, block_exists, remove_old_block};

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read should succeed in test temp dirs")
}

#[test]
fn missing_file_is_created_with_a_block() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");

    assert!(!block_exists(&path));
    add_or_update_block(&path, "knowledge index").expect("add should succeed");

    assert!(block_exists(&path));
    let content = read(&path);
    assert!(content.starts_with(BLOCK_START));
    assert!(content.contains("knowledge index"));
    assert!(content.ends_with(&format!("{BLOCK_END}\n")));
}

#[test]
fn append_separates_from_existing_content_with_one_blank_line() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");
    write_file(&path, "# Project notes\nSome rules.\n");

    add_or_update_block(&path, "body").expect("add should succeed");

    let content = read(&path);
    assert!(content.starts_with("# Project notes\nSome rules.\n\n"));
    assert!(!content.contains("\n\n\n"));
}

#[test]
fn block_round_trip_replaces_content_in_place() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");
    write_file(&path, "# Header\n\nUser text above.\n");

    add_or_update_block(&path, "first version").expect("first add should succeed");
    let after_first = read(&path);
    write_file(
        &path,
        &format!("{after_first}\nUser text below the block.\n"),
    );

    add_or_update_block(&path, "second version").expect("second add should succeed");

    let content = read(&path);
    assert_eq!(content.matches(BLOCK_START).count(), 1);
    assert_eq!(content.matches(BLOCK_END).count(), 1);
    assert!(content.contains("second version"));
    assert!(!content.contains("first version"));
    // Everything outside the block survives byte-for-byte.
    assert!(content.starts_with("# Header\n\nUser text above.\n\n"));
    assert!(content.ends_with("\nUser text below the block.\n"));
}

#[test]
fn same_content_twice_is_a_no_op() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("AGENTS.md");
    write_file(&path, "# AGENTS.md\n\n");

    add_or_update_block(&path, "stable body").expect("first add should succeed");
    let first = read(&path);
    add_or_update_block(&path, "stable body").expect("second add should succeed");
    assert_eq!(read(&path), first);
}

#[test]
fn remove_is_a_no_op_without_a_block() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("GEMINI.md");

    remove_old_block(&path).expect("remove on missing file should succeed");
    assert!(!path.exists());

    write_file(&path, "plain file\n");
    remove_old_block(&path).expect("remove without block should succeed");
    assert_eq!(read(&path), "plain file\n");
}

#[test]
fn add_remove_cycles_do_not_accumulate_blank_lines() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");
    write_file(&path, "# Project\n");

    for _ in 0..3 {
        add_or_update_block(&path, "body").expect("add should succeed");
        remove_old_block(&path).expect("remove should succeed");
    }

    assert_eq!(read(&path), "# Project\n");
}

#[test]
fn remove_twice_equals_remove_once() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");
    write_file(&path, "intro\n");

    add_or_update_block(&path, "body").expect("add should succeed");
    remove_old_block(&path).expect("first remove should succeed");
    let once = read(&path);
    remove_old_block(&path).expect("second remove should succeed");
    assert_eq!(read(&path), once);
}

#[test]
fn mid_file_removal_preserves_spacing_around_the_seam() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");
    write_file(
        &path,
        &format!("intro\n\n{BLOCK_START}\nbody\n{BLOCK_END}\noutro\n"),
    );

    remove_old_block(&path).expect("remove should succeed");
    assert_eq!(read(&path), "intro\n\noutro\n");
}

#[test]
fn hand_edits_inside_the_block_are_overwritten() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");

    add_or_update_block(&path, "generated").expect("add should succeed");
    let tampered = read(&path).replace("generated", "hand edited");
    write_file(&path, &tampered);

    add_or_update_block(&path, "generated").expect("re-sync should succeed");
    let content = read(&path);
    assert!(content.contains("generated"));
    assert!(!content.contains("hand edited"));
}

#[test]
fn block_exists_requires_ordered_markers() {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let path = tmp.path().join("CLAUDE.md");

    write_file(&path, &format!("{BLOCK_END}\n{BLOCK_START}\n"));
    assert!(!block_exists(&path));

    write_file(&path, &format!("{BLOCK_START}\n{BLOCK_END}\n"));
    assert!(block_exists(&path));
}
