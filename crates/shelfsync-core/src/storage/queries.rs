use super::models::*;
use super::sqlite::Database;
use super::CatalogStore;
use crate::error::Error;
use rusqlite::types::ToSql;
use rusqlite::{params, Result, Row};
use tracing::debug;

const BOOK_COLUMNS: &str = "id, title, author, year, pages, image_path, book_link, added_at";

fn map_book(row: &Row<'_>) -> Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        pages: row.get(4)?,
        image_path: row.get(5)?,
        book_link: row.get(6)?,
        added_at: row.get(7)?,
    })
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl Database {
    // ── Lookups ──────────────────────────────────────────────────

    pub fn book_exists(&self, book_link: &str) -> Result<bool> {
        self.connection().query_row(
            "SELECT EXISTS(SELECT 1 FROM book WHERE book_link = ?1)",
            params![book_link],
            |row| row.get(0),
        )
    }

    pub fn list_books(&self) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM book ORDER BY id"))?;
        let books = stmt
            .query_map([], map_book)?
            .collect::<Result<Vec<_>>>()?;
        Ok(books)
    }

    pub fn get_book(&self, book_id: i64) -> Result<Option<CatalogEntry>> {
        match self.connection().query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM book WHERE id = ?1"),
            params![book_id],
            map_book,
        ) {
            Ok(book) => Ok(Some(book)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_book_by_link(&self, book_link: &str) -> Result<Option<CatalogEntry>> {
        match self.connection().query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM book WHERE book_link = ?1"),
            params![book_link],
            map_book,
        ) {
            Ok(book) => Ok(Some(book)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Case-insensitive substring match on the title.
    pub fn find_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>> {
        self.find_by_column("title", title)
    }

    /// Case-insensitive substring match on the author.
    pub fn find_by_author(&self, author: &str) -> Result<Vec<CatalogEntry>> {
        self.find_by_column("author", author)
    }

    fn find_by_column(&self, column: &str, needle: &str) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM book \
             WHERE {column} LIKE ?1 ESCAPE '\\' ORDER BY id"
        ))?;
        let books = stmt
            .query_map(params![like_pattern(needle)], map_book)?
            .collect::<Result<Vec<_>>>()?;
        Ok(books)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Insert all entries in one transaction. Entries whose `book_link` is
    /// already present are left alone and not counted.
    pub fn insert_books(&self, entries: &[NewCatalogEntry]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO book \
                 (title, author, year, pages, image_path, book_link, added_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                 ON CONFLICT(book_link) DO NOTHING",
            )?;
            for entry in entries {
                count += stmt.execute(params![
                    entry.title,
                    entry.author,
                    entry.year,
                    entry.pages,
                    entry.image_path,
                    entry.book_link,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} of {} catalog entries", count, entries.len());
        Ok(count)
    }

    /// Apply a partial update. Returns the updated row, or `None` when the
    /// update is empty or the row does not exist.
    pub fn update_book(&self, book_id: i64, update: &BookUpdate) -> Result<Option<CatalogEntry>> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(title) = &update.title {
            assignments.push("title = ?");
            values.push(title);
        }
        if let Some(author) = &update.author {
            assignments.push("author = ?");
            values.push(author);
        }
        if let Some(year) = &update.year {
            assignments.push("year = ?");
            values.push(year);
        }
        if let Some(image_path) = &update.image_path {
            assignments.push("image_path = ?");
            values.push(image_path);
        }

        if assignments.is_empty() {
            return Ok(None);
        }

        values.push(&book_id);
        let sql = format!("UPDATE book SET {} WHERE id = ?", assignments.join(", "));
        let changed = self.connection().execute(&sql, values.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        debug!("Updated book {} ({})", book_id, assignments.join(", "));
        self.get_book(book_id)
    }

    /// Delete a single row, returning it if it existed.
    pub fn delete_book(&self, book_id: i64) -> Result<Option<CatalogEntry>> {
        let tx = self.connection().unchecked_transaction()?;
        let existing = self.get_book(book_id)?;
        if existing.is_some() {
            tx.execute("DELETE FROM book WHERE id = ?1", params![book_id])?;
        }
        tx.commit()?;
        Ok(existing)
    }

    /// Remove every catalog row and restart id numbering.
    pub fn delete_all_books(&self) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM book", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'book'", [])?;
        tx.commit()?;
        debug!("Removed {} catalog entries", removed);
        Ok(removed)
    }

    pub fn count_books(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM book", [], |row| row.get(0))
    }
}

impl CatalogStore for Database {
    fn exists(&self, identity: &str) -> std::result::Result<bool, Error> {
        Ok(self.book_exists(identity)?)
    }

    fn insert_many(&self, entries: &[NewCatalogEntry]) -> std::result::Result<usize, Error> {
        Ok(self.insert_books(entries)?)
    }
}
