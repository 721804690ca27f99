//! Resolving one user's read shelf into canonical-id ratings.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::identifiers::IdentifierMap;
use crate::services::review_api::{RawReview, ReviewApi};
use crate::stats::{Cleaned, DropCounts};

/// A positive rating of a catalog book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRating {
    pub book_id: i64,
    pub isbn: String,
    pub rating: i64,
}

/// Fetches every page of the user's read shelf.
///
/// Pages are requested in order from 1 until one comes back short. Each
/// request is bounded by `page_timeout`; a failed or expired request fails
/// the whole call and discards the pages already collected.
#[tracing::instrument(skip(api))]
pub async fn fetch_read_shelf<A>(
    user_id: u64,
    api: &A,
    page_timeout: Duration,
) -> Result<Vec<RawReview>>
where
    A: ReviewApi + ?Sized,
{
    let mut collected = Vec::new();
    let mut page = 1u32;

    loop {
        let fetched = tokio::time::timeout(page_timeout, api.fetch_page(user_id, page)).await;
        let batch = match fetched {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                warn!(page, error = %e, "Page fetch failed");
                return Err(PipelineError::UpstreamFetch {
                    user_id,
                    page,
                    reason: format!("{e:#}"),
                });
            }
            Err(_) => {
                warn!(page, timeout_ms = page_timeout.as_millis() as u64, "Page fetch timed out");
                return Err(PipelineError::UpstreamFetch {
                    user_id,
                    page,
                    reason: format!("timed out after {page_timeout:?}"),
                });
            }
        };

        let has_more = batch.has_more();
        debug!(page, reviews = batch.reviews.len(), has_more, "Page received");
        collected.extend(batch.reviews);

        if !has_more {
            break;
        }
        page += 1;
    }

    info!(pages = page, reviews = collected.len(), "Read shelf fetched");
    Ok(collected)
}

/// Maps each review's ISBN to a canonical book id, keeping positive ratings
/// of mapped books only.
pub fn remap_ratings(raw: Vec<RawReview>, isbn_map: &IdentifierMap) -> Cleaned<Vec<UserRating>> {
    let mut drops = DropCounts::default();
    let mut ratings = Vec::with_capacity(raw.len());

    for review in raw {
        let Some((isbn, book_id)) = review
            .isbn
            .and_then(|isbn| isbn_map.get(&isbn).map(|id| (isbn, id)))
        else {
            drops.unmapped_identifiers += 1;
            continue;
        };
        if review.rating <= 0 {
            drops.unrated += 1;
            continue;
        }
        ratings.push(UserRating {
            book_id,
            isbn,
            rating: review.rating,
        });
    }

    Cleaned::new(ratings, drops)
}

/// Fetches and resolves a user's ratings.
pub async fn resolve<A>(
    user_id: u64,
    api: &A,
    isbn_map: &IdentifierMap,
    page_timeout: Duration,
) -> Result<Cleaned<Vec<UserRating>>>
where
    A: ReviewApi + ?Sized,
{
    let raw = fetch_read_shelf(user_id, api, page_timeout).await?;
    let resolved = remap_ratings(raw, isbn_map);
    info!(
        user_id,
        ratings = resolved.value.len(),
        unmapped = resolved.drops.unmapped_identifiers,
        unrated = resolved.drops.unrated,
        "User ratings resolved"
    );
    Ok(resolved)
}
