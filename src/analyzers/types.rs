//! Data types produced by the merge and aggregation stages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sources::authors::{Gender, Race};
use crate::stats::DropCounts;

/// A catalog book joined with one of its classified authors.
///
/// Books with no classified author appear once with every author field
/// empty. Field order is the column order of the written table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedBook {
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
    pub author_id: Option<i64>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub race: Option<Race>,
    pub gender: Option<Gender>,
    pub image_url: Option<String>,
    pub about: Option<String>,
    pub influences: Option<String>,
    pub works_count: Option<String>,
    pub hometown: Option<String>,
    pub born_at: Option<String>,
    pub died_at: Option<String>,
}

impl ClassifiedBook {
    pub fn canonical_id(&self) -> i64 {
        self.best_book_id.unwrap_or(self.book_id)
    }
}

/// Identity of one author's contribution to one title. Rereading the same
/// title yields the same key; a co-authored title yields one key per author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuthorBookKey {
    pub book_id: i64,
    pub author_id: i64,
}

/// Distinct author-book count for one (race, gender) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub race: Race,
    pub gender: Gender,
    pub distinct_count: usize,
    pub percentage: f64,
}

/// One user's reading breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub user_id: u64,
    pub generated_at: DateTime<Utc>,
    pub rated_books: usize,
    pub groups: Vec<GroupCount>,
    pub drops: DropCounts,
}

/// A [`GroupCount`] flattened for the appended report CSV.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub generated_at: DateTime<Utc>,
    pub user_id: u64,
    pub race: Race,
    pub gender: Gender,
    pub distinct_count: usize,
    pub percentage: f64,
}

impl UserReport {
    pub fn rows(&self) -> Vec<ReportRow> {
        self.groups
            .iter()
            .map(|g| ReportRow {
                generated_at: self.generated_at,
                user_id: self.user_id,
                race: g.race,
                gender: g.gender,
                distinct_count: g.distinct_count,
                percentage: g.percentage,
            })
            .collect()
    }
}
