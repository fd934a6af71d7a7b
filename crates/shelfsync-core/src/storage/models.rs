use serde::Serialize;

/// A document row in the catalog. `book_link` is the identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub pages: u32,
    pub image_path: String,
    pub book_link: String,
    pub added_at: String,
}

/// Insert shape for a catalog row, built by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCatalogEntry {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub pages: u32,
    pub image_path: String,
    pub book_link: String,
}

/// Partial update of a catalog row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub image_path: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.year.is_none()
            && self.image_path.is_none()
    }
}
