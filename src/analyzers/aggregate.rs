use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::analyzers::types::{AuthorBookKey, ClassifiedBook, GroupCount};
use crate::services::user_ratings::UserRating;
use crate::sources::authors::{Gender, Race};
use crate::stats::{Cleaned, DropCounts, pct};

/// Counts the distinct author-book pairs a user has rated, grouped by the
/// author's race and gender.
///
/// Ratings for books missing from `classified` are skipped, as are catalog
/// rows without a classified author. The same author-book pair rated twice
/// counts once. Groups come back ordered by (race, gender) and their
/// percentages sum to one.
pub fn aggregate(ratings: &[UserRating], classified: &[ClassifiedBook]) -> Cleaned<Vec<GroupCount>> {
    let mut drops = DropCounts::default();

    let mut catalog: HashMap<i64, Vec<&ClassifiedBook>> = HashMap::new();
    for row in classified {
        catalog.entry(row.canonical_id()).or_default().push(row);
    }

    let mut groups: BTreeMap<(Race, Gender), HashSet<AuthorBookKey>> = BTreeMap::new();
    for rating in ratings {
        let Some(rows) = catalog.get(&rating.book_id) else {
            drops.uncatalogued_ratings += 1;
            continue;
        };

        for row in rows {
            let (Some(author_id), Some(race), Some(gender)) = (row.author_id, row.race, row.gender)
            else {
                drops.books_without_authors += 1;
                continue;
            };
            groups.entry((race, gender)).or_default().insert(AuthorBookKey {
                book_id: row.canonical_id(),
                author_id,
            });
        }
    }

    let total: usize = groups.values().map(HashSet::len).sum();
    debug!(groups = groups.len(), total, "Author-book pairs grouped");

    let counts = groups
        .into_iter()
        .map(|((race, gender), keys)| GroupCount {
            race,
            gender,
            distinct_count: keys.len(),
            percentage: pct(keys.len(), total),
        })
        .collect();

    Cleaned::new(counts, drops)
}
