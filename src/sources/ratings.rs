//! Bulk rating exports: Amazon review ratings and the goodbooks-10k
//! ratings table.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Schema, read_table, required_id};
use crate::error::{PipelineError, Result};
use crate::identifiers::{build_map, coerce_id};
use crate::stats::{Cleaned, DropCounts};

const GOODBOOKS_RATINGS: Schema = Schema {
    table: "goodbooks_ratings",
    required: &["book_id", "user_id", "rating"],
};

const GOODBOOKS_BOOKS: Schema = Schema {
    table: "goodbooks_books",
    required: &["book_id", "best_book_id"],
};

/// Columns of the headerless Amazon ratings export, in file order.
const AMAZON_COLUMNS: &[&str] = &[
    "book_id",
    "asin",
    "user_id",
    "helpful",
    "rating",
    "unix_review_time",
];

/// A rating from a bulk export, keyed by canonical book id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRating {
    pub user_id: String,
    pub book_id: i64,
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
struct GoodbooksRatingRecord {
    book_id: Option<String>,
    user_id: Option<String>,
    rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoodbooksBookRecord {
    book_id: Option<String>,
    best_book_id: Option<String>,
}

/// Reads the headerless Amazon ratings export, whose book ids are already
/// canonical.
pub fn load_amazon_ratings<R: Read>(reader: R) -> Result<Cleaned<Vec<CatalogRating>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut drops = DropCounts::default();
    let mut ratings = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.len() < AMAZON_COLUMNS.len() {
            return Err(PipelineError::Schema {
                table: "amazon_ratings",
                missing: AMAZON_COLUMNS[record.len()..]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            });
        }

        let Some(book_id) = required_id("book_id", Some(&record[0]), &mut drops) else {
            continue;
        };
        let Some(rating) = required_id("rating", Some(&record[4]), &mut drops) else {
            continue;
        };

        ratings.push(CatalogRating {
            user_id: record[2].to_string(),
            book_id,
            rating,
        });
    }

    info!(ratings = ratings.len(), "Amazon ratings loaded");
    Ok(Cleaned::new(ratings, drops))
}

/// Reads goodbooks-10k ratings and rewrites their dataset-local book ids to
/// canonical ids using the dataset's `books.csv`. Ratings whose book has no
/// canonical id are dropped.
pub fn load_goodbooks_ratings<R1: Read, R2: Read>(
    ratings: R1,
    books: R2,
) -> Result<Cleaned<Vec<CatalogRating>>> {
    let book_records: Vec<GoodbooksBookRecord> = read_table(books, &GOODBOOKS_BOOKS)?;
    let (book_map, mut drops) = build_map(
        book_records
            .into_iter()
            .filter_map(|r| Some((r.book_id?, r.best_book_id))),
        None,
    )
    .into_parts();

    let records: Vec<GoodbooksRatingRecord> = read_table(ratings, &GOODBOOKS_RATINGS)?;
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let Some(local_id) = record.book_id else {
            drops.unparseable_ids += 1;
            continue;
        };
        let Some(book_id) = book_map.get(&local_id) else {
            drops.unmapped_identifiers += 1;
            continue;
        };
        let rating = match record.rating.as_deref().map(|r| coerce_id("rating", r)) {
            Some(Ok(r)) => r,
            _ => {
                drops.unparseable_ids += 1;
                continue;
            }
        };

        out.push(CatalogRating {
            user_id: record.user_id.unwrap_or_default(),
            book_id,
            rating,
        });
    }

    info!(
        ratings = out.len(),
        unmapped = drops.unmapped_identifiers,
        "Goodbooks ratings loaded"
    );
    Ok(Cleaned::new(out, drops))
}
