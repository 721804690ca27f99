use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::classify::classify;
use crate::analyzers::types::{ClassifiedBook, UserReport};
use crate::config::DataConfig;
use crate::error::Result;
use crate::identifiers::{IdentifierMap, load_isbn_map};
use crate::services::review_api::ReviewApi;
use crate::services::user_ratings::resolve;
use crate::sources::authors::load_authors;
use crate::sources::books::{canonical_ids, load_books};
use crate::sources::links::load_links;
use crate::sources::open_source;
use crate::stats::DropCounts;

/// Everything a user analysis is joined against.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub classified: Vec<ClassifiedBook>,
    pub isbn_map: IdentifierMap,
    pub drops: DropCounts,
}

/// Loads the book, author and link tables named in `config`, classifies the
/// books, and loads the ISBN map (restricted to catalog books when
/// `config.restrict_isbn_map` is set).
pub fn load_catalog(config: &DataConfig) -> Result<Catalog> {
    let mut drops = DropCounts::default();

    let (books, d) = load_books(open_source(&config.books)?)?.into_parts();
    drops.absorb(d);
    let (authors, d) = load_authors(open_source(&config.authors)?)?.into_parts();
    drops.absorb(d);
    let (links, d) = load_links(open_source(&config.author_books)?)?.into_parts();
    drops.absorb(d);

    let (classified, d) = classify(&links, &authors, &books).into_parts();
    drops.absorb(d);

    let allowed = config.restrict_isbn_map.then(|| canonical_ids(&books));
    let (isbn_map, d) = load_isbn_map(open_source(&config.isbn_map)?, allowed.as_ref())?.into_parts();
    drops.absorb(d);

    info!(
        classified_rows = classified.len(),
        isbn_entries = isbn_map.len(),
        "Catalog loaded"
    );
    drops.log("catalog");

    Ok(Catalog {
        classified,
        isbn_map,
        drops,
    })
}

/// Fetches a user's shelf and breaks it down by author race and gender.
pub async fn analyze_user<A>(
    user_id: u64,
    api: &A,
    catalog: &Catalog,
    page_timeout: Duration,
) -> Result<UserReport>
where
    A: ReviewApi + ?Sized,
{
    let (ratings, mut drops) = resolve(user_id, api, &catalog.isbn_map, page_timeout)
        .await?
        .into_parts();

    let (groups, d) = aggregate(&ratings, &catalog.classified).into_parts();
    drops.absorb(d);
    drops.log("user");

    Ok(UserReport {
        user_id,
        generated_at: Utc::now(),
        rated_books: ratings.len(),
        groups,
        drops,
    })
}
