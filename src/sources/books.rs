//! Book catalog loader.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Schema, read_table, required_id};
use crate::error::Result;
use crate::identifiers::coerce_id;
use crate::stats::{Cleaned, DropCounts};

/// Language codes kept by [`retain_english`].
pub const ENGLISH_LANGUAGE_CODES: &[&str] = &["eng", "en-US", "en-GB", "en-CA", "en"];

const SCHEMA: Schema = Schema {
    table: "books",
    required: &["book_id", "language_code"],
};

#[derive(Debug, Deserialize)]
struct BookRecord {
    book_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    isbn: Option<String>,
    #[serde(default)]
    isbn13: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    work_id: Option<String>,
    #[serde(default)]
    best_book_id: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub book_id: i64,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub country_code: Option<String>,
    pub language_code: Option<String>,
    pub description: Option<String>,
    pub work_id: Option<String>,
    pub best_book_id: Option<i64>,
    pub original_title: Option<String>,
}

impl Book {
    /// The id shared by every edition of this title.
    pub fn canonical_id(&self) -> i64 {
        self.best_book_id.unwrap_or(self.book_id)
    }

    pub fn is_english(&self) -> bool {
        self.language_code
            .as_deref()
            .is_some_and(|code| ENGLISH_LANGUAGE_CODES.contains(&code))
    }
}

/// Keeps only books in one of [`ENGLISH_LANGUAGE_CODES`]. Retained rows are
/// returned untouched.
pub fn retain_english(books: Vec<Book>) -> Cleaned<Vec<Book>> {
    let before = books.len();
    let kept: Vec<Book> = books.into_iter().filter(Book::is_english).collect();

    let drops = DropCounts {
        non_english_books: before - kept.len(),
        ..Default::default()
    };
    Cleaned::new(kept, drops)
}

/// Canonical ids of every book in the catalog.
pub fn canonical_ids(books: &[Book]) -> HashSet<i64> {
    books.iter().map(Book::canonical_id).collect()
}

/// Reads the book CSV and keeps the English-language rows.
///
/// A `best_book_id` that is not an integer reads as absent and is counted;
/// only a row whose `book_id` is unusable is dropped before the language
/// filter.
pub fn load_books<R: Read>(reader: R) -> Result<Cleaned<Vec<Book>>> {
    let records: Vec<BookRecord> = read_table(reader, &SCHEMA)?;
    let mut drops = DropCounts::default();

    let mut books = Vec::with_capacity(records.len());
    for record in records {
        let Some(book_id) = required_id("book_id", record.book_id.as_deref(), &mut drops) else {
            continue;
        };
        let best_book_id = match record.best_book_id.as_deref().map(|r| coerce_id("best_book_id", r)) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => {
                debug!(book_id, error = %e, "Treating unparseable best_book_id as absent");
                drops.unparseable_ids += 1;
                None
            }
            None => None,
        };

        books.push(Book {
            book_id,
            title: record.title,
            isbn: record.isbn,
            isbn13: record.isbn13,
            country_code: record.country_code,
            language_code: record.language_code,
            description: record.description,
            work_id: record.work_id,
            best_book_id,
            original_title: record.original_title,
        });
    }

    let (books, filtered) = retain_english(books).into_parts();
    drops.absorb(filtered);

    info!(
        books = books.len(),
        non_english = drops.non_english_books,
        "Books loaded"
    );
    Ok(Cleaned::new(books, drops))
}
