//! Trait and types for reading a user's shelf from a review service.

use anyhow::Result;

/// Maximum reviews the service returns per page. A full page means more
/// may follow.
pub const PER_PAGE: usize = 200;

/// One review as returned by the service, before identifier resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    /// The service's own book id.
    pub book_id: String,
    pub isbn: Option<String>,
    pub rating: i64,
}

/// One page of a user's read shelf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPage {
    pub reviews: Vec<RawReview>,
}

impl ReviewPage {
    pub fn has_more(&self) -> bool {
        self.reviews.len() >= PER_PAGE
    }
}

/// Abstraction over a paginated review provider (e.g., Goodreads).
#[async_trait::async_trait]
pub trait ReviewApi: Send + Sync {
    /// Returns page `page` (1-based) of the user's read shelf.
    async fn fetch_page(&self, user_id: u64, page: u32) -> Result<ReviewPage>;
}
