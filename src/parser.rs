//! XML parser for Goodreads `review/list` responses.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::services::review_api::{RawReview, ReviewPage};

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

impl TextNode {
    fn text(self) -> Option<String> {
        self.value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GoodreadsResponse {
    #[serde(default)]
    reviews: ReviewList,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewList {
    #[serde(default)]
    review: Vec<ReviewNode>,
}

#[derive(Debug, Deserialize)]
struct ReviewNode {
    book: BookNode,
    #[serde(default)]
    rating: TextNode,
}

#[derive(Debug, Deserialize)]
struct BookNode {
    #[serde(default)]
    id: TextNode,
    #[serde(default)]
    isbn: TextNode,
}

/// Decodes one page of a user's shelf.
///
/// # Errors
///
/// Returns an error if the body is not UTF-8, is not a well-formed review
/// list, or a review carries a rating that is not an integer.
pub fn parse_review_page(bytes: &[u8]) -> Result<ReviewPage> {
    let body = std::str::from_utf8(bytes).context("review list is not valid UTF-8")?;
    let response: GoodreadsResponse =
        quick_xml::de::from_str(body).context("malformed review list")?;

    let reviews = response
        .reviews
        .review
        .into_iter()
        .map(|node| {
            let book_id = node.book.id.text().unwrap_or_default();
            let raw_rating = node.rating.text().unwrap_or_default();
            let rating = raw_rating
                .parse::<i64>()
                .with_context(|| format!("invalid rating {raw_rating:?} for book {book_id}"))?;
            Ok(RawReview {
                book_id,
                isbn: node.book.isbn.text(),
                rating,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReviewPage { reviews })
}
