//! Counters for rows removed by cleaning rules.

use serde::Serialize;
use tracing::info;

/// Tally of rows each pipeline stage removed, by reason.
///
/// Every counter corresponds to an expected data-cleaning outcome, never an
/// error. Stages return their own counts and callers fold them together with
/// [`DropCounts::absorb`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    // loaders
    pub non_english_books: usize,
    /// Also counts optional id cells read as absent.
    pub unparseable_ids: usize,
    pub unclassified_authors: usize,
    pub empty_reviews: usize,

    // identifier mapping
    pub missing_canonical_id: usize,
    pub outside_allow_set: usize,
    pub overwritten_keys: usize,
    pub unmapped_identifiers: usize,

    // merge
    pub links_without_author: usize,

    // user ratings
    pub unrated: usize,
    pub uncatalogued_ratings: usize,
    pub books_without_authors: usize,
}

impl DropCounts {
    pub fn absorb(&mut self, other: DropCounts) {
        self.non_english_books += other.non_english_books;
        self.unparseable_ids += other.unparseable_ids;
        self.unclassified_authors += other.unclassified_authors;
        self.empty_reviews += other.empty_reviews;
        self.missing_canonical_id += other.missing_canonical_id;
        self.outside_allow_set += other.outside_allow_set;
        self.overwritten_keys += other.overwritten_keys;
        self.unmapped_identifiers += other.unmapped_identifiers;
        self.links_without_author += other.links_without_author;
        self.unrated += other.unrated;
        self.uncatalogued_ratings += other.uncatalogued_ratings;
        self.books_without_authors += other.books_without_authors;
    }

    /// Rows removed, overwritten or repaired, across all reasons.
    pub fn total(&self) -> usize {
        self.non_english_books
            + self.unparseable_ids
            + self.unclassified_authors
            + self.empty_reviews
            + self.missing_canonical_id
            + self.outside_allow_set
            + self.overwritten_keys
            + self.unmapped_identifiers
            + self.links_without_author
            + self.unrated
            + self.uncatalogued_ratings
            + self.books_without_authors
    }

    pub fn log(&self, stage: &str) {
        info!(
            stage,
            total = self.total(),
            non_english_books = self.non_english_books,
            unparseable_ids = self.unparseable_ids,
            unclassified_authors = self.unclassified_authors,
            empty_reviews = self.empty_reviews,
            missing_canonical_id = self.missing_canonical_id,
            outside_allow_set = self.outside_allow_set,
            overwritten_keys = self.overwritten_keys,
            unmapped_identifiers = self.unmapped_identifiers,
            links_without_author = self.links_without_author,
            unrated = self.unrated,
            uncatalogued_ratings = self.uncatalogued_ratings,
            books_without_authors = self.books_without_authors,
            "Rows dropped"
        );
    }
}

/// A stage's output together with what it dropped to produce it.
#[derive(Debug, Clone)]
pub struct Cleaned<T> {
    pub value: T,
    pub drops: DropCounts,
}

impl<T> Cleaned<T> {
    pub fn new(value: T, drops: DropCounts) -> Self {
        Self { value, drops }
    }

    pub fn into_parts(self) -> (T, DropCounts) {
        (self.value, self.drops)
    }
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
