use shelfsync_core::storage::models::*;
use shelfsync_core::storage::{CatalogStore, Database};

fn make_test_entry(file_name: &str, title: &str, author: &str) -> NewCatalogEntry {
    let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name);
    NewCatalogEntry {
        title: title.to_string(),
        author: author.to_string(),
        year: 2001,
        pages: 120,
        image_path: format!("/images_static/{}.jpg", stem),
        book_link: format!("/books_static/{}", file_name),
    }
}

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    let entries = vec![
        make_test_entry("dune.pdf", "Dune", "Frank Herbert"),
        make_test_entry("emma.pdf", "Emma", "Jane Austen"),
        make_test_entry("persuasion.pdf", "Persuasion", "Jane Austen"),
    ];
    assert_eq!(db.insert_books(&entries).unwrap(), 3);
    db
}

#[test]
fn test_insert_and_exists() {
    let db = seeded();
    assert!(db.exists("/books_static/dune.pdf").unwrap());
    assert!(!db.exists("/books_static/missing.pdf").unwrap());
    assert_eq!(db.count_books().unwrap(), 3);

    let dune = db.get_book_by_link("/books_static/dune.pdf").unwrap().unwrap();
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.pages, 120);
    assert_eq!(dune.image_path, "/images_static/dune.jpg");
    assert!(!dune.added_at.is_empty());
}

#[test]
fn test_insert_many_skips_existing_identities() {
    let db = seeded();
    let batch = vec![
        make_test_entry("dune.pdf", "Dune again", "Someone"),
        make_test_entry("ulysses.pdf", "Ulysses", "James Joyce"),
    ];
    let inserted = db.insert_many(&batch).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(db.count_books().unwrap(), 4);

    let dune = db.get_book_by_link("/books_static/dune.pdf").unwrap().unwrap();
    assert_eq!(dune.title, "Dune");
}

#[test]
fn test_insert_many_empty_batch() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.insert_many(&[]).unwrap(), 0);
}

#[test]
fn test_find_by_title_and_author_case_insensitive() {
    let db = seeded();

    let by_title = db.find_by_title("EMM").unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "Emma");

    let by_author = db.find_by_author("austen").unwrap();
    assert_eq!(by_author.len(), 2);

    assert!(db.find_by_title("%").unwrap().is_empty());
}

#[test]
fn test_list_and_get() {
    let db = seeded();
    let books = db.list_books().unwrap();
    assert_eq!(books.len(), 3);

    let first = db.get_book(books[0].id).unwrap().unwrap();
    assert_eq!(first, books[0]);
    assert!(db.get_book(9999).unwrap().is_none());
}

#[test]
fn test_partial_update_leaves_other_fields() {
    let db = seeded();
    let dune = db.get_book_by_link("/books_static/dune.pdf").unwrap().unwrap();

    let updated = db
        .update_book(
            dune.id,
            &BookUpdate {
                year: Some(1965),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.year, 1965);
    assert_eq!(updated.title, "Dune");
    assert_eq!(updated.author, "Frank Herbert");
    assert_eq!(updated.book_link, dune.book_link);
}

#[test]
fn test_update_nothing_or_missing_returns_none() {
    let db = seeded();
    assert!(db.update_book(1, &BookUpdate::default()).unwrap().is_none());
    assert!(db
        .update_book(
            9999,
            &BookUpdate {
                title: Some("X".to_string()),
                ..Default::default()
            }
        )
        .unwrap()
        .is_none());
}

#[test]
fn test_delete_book() {
    let db = seeded();
    let emma = db.get_book_by_link("/books_static/emma.pdf").unwrap().unwrap();

    let deleted = db.delete_book(emma.id).unwrap().unwrap();
    assert_eq!(deleted.title, "Emma");
    assert!(!db.exists("/books_static/emma.pdf").unwrap());
    assert!(db.delete_book(emma.id).unwrap().is_none());
    assert_eq!(db.count_books().unwrap(), 2);
}

#[test]
fn test_delete_all_restarts_ids() {
    let db = seeded();
    assert_eq!(db.delete_all_books().unwrap(), 3);
    assert_eq!(db.count_books().unwrap(), 0);

    db.insert_books(&[make_test_entry("dune.pdf", "Dune", "Frank Herbert")])
        .unwrap();
    let books = db.list_books().unwrap();
    assert_eq!(books[0].id, 1);
}

#[test]
fn test_reopen_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    {
        let db = Database::open(path.to_str().unwrap()).unwrap();
        db.insert_books(&[make_test_entry("dune.pdf", "Dune", "Frank Herbert")])
            .unwrap();
    }
    let db = Database::open(path.to_str().unwrap()).unwrap();
    let version: i64 = db
        .connection()
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 1);
    assert_eq!(db.count_books().unwrap(), 1);
}
