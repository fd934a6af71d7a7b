#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::fs;
use std::path::Path;

pub struct PdfFixture<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub creation_date: Option<&'a str>,
    pub pages: usize,
}

impl Default for PdfFixture<'_> {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            creation_date: None,
            pages: 1,
        }
    }
}

/// Write a minimal, valid PDF with the given Info entries and page count.
pub fn write_pdf(path: &Path, fixture: &PdfFixture<'_>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..fixture.pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => fixture.pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = Dictionary::new();
    if let Some(title) = fixture.title {
        info.set("Title", Object::string_literal(title));
    }
    if let Some(author) = fixture.author {
        info.set("Author", Object::string_literal(author));
    }
    if let Some(date) = fixture.creation_date {
        info.set("CreationDate", Object::string_literal(date));
    }
    if !info.is_empty() {
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"this is not a pdf document").unwrap();
}
