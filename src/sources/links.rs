//! Author-to-book links.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Schema, read_table, required_id};
use crate::error::Result;
use crate::stats::{Cleaned, DropCounts};

const SCHEMA: Schema = Schema {
    table: "author_books",
    required: &["book_id", "author_id"],
};

#[derive(Debug, Deserialize)]
struct LinkRecord {
    book_id: Option<String>,
    author_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// One authorship of one book. A book with several authors has one link
/// per author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBookLink {
    pub book_id: i64,
    pub author_id: i64,
    pub name: Option<String>,
    pub role: Option<String>,
}

pub fn load_links<R: Read>(reader: R) -> Result<Cleaned<Vec<AuthorBookLink>>> {
    let records: Vec<LinkRecord> = read_table(reader, &SCHEMA)?;
    let mut drops = DropCounts::default();

    let links: Vec<AuthorBookLink> = records
        .into_iter()
        .filter_map(|r| {
            let book_id = required_id("book_id", r.book_id.as_deref(), &mut drops)?;
            let author_id = required_id("author_id", r.author_id.as_deref(), &mut drops)?;
            Some(AuthorBookLink {
                book_id,
                author_id,
                name: r.name,
                role: r.role,
            })
        })
        .collect();

    info!(links = links.len(), "Author-book links loaded");
    Ok(Cleaned::new(links, drops))
}
