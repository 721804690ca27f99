//! Review text from the Amazon review exports.

use std::collections::BTreeMap;
use std::io::{BufRead, Read};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::required_id;
use crate::error::{PipelineError, Result};
use crate::identifiers::IdentifierMap;
use crate::stats::{Cleaned, DropCounts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub book_id: i64,
    pub asin: String,
    pub summary: Option<String>,
    pub text: String,
}

/// All review text for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDigest {
    pub book_id: i64,
    pub review_count: usize,
    pub text: String,
}

/// One line of a raw review dump.
#[derive(Debug, Deserialize)]
struct DumpLine {
    asin: String,
    #[serde(rename = "reviewText", default)]
    review_text: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

/// Reads the headerless `best_book_id,asin,summary,review_text` export.
/// Rows without review text are dropped.
pub fn load_review_csv<R: Read>(reader: R) -> Result<Cleaned<Vec<Review>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut drops = DropCounts::default();
    let mut reviews = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.len() < 4 {
            return Err(PipelineError::Schema {
                table: "reviews",
                missing: ["best_book_id", "asin", "summary", "review_text"][record.len()..]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            });
        }

        if record[3].trim().is_empty() {
            drops.empty_reviews += 1;
            continue;
        }
        let Some(book_id) = required_id("best_book_id", Some(&record[0]), &mut drops) else {
            continue;
        };

        reviews.push(Review {
            book_id,
            asin: record[1].to_string(),
            summary: Some(record[2].to_string()).filter(|s| !s.is_empty()),
            text: record[3].to_string(),
        });
    }

    info!(reviews = reviews.len(), "Review export loaded");
    Ok(Cleaned::new(reviews, drops))
}

/// Reads a JSON-lines review dump, resolving each review's ASIN to a
/// canonical book id through `asin_map`.
///
/// Blank lines are skipped; a malformed line fails the load.
pub fn load_review_dump<R: BufRead>(
    reader: R,
    asin_map: &IdentifierMap,
) -> Result<Cleaned<Vec<Review>>> {
    let mut drops = DropCounts::default();
    let mut reviews = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: DumpLine = serde_json::from_str(&line)?;

        let Some(text) = parsed.review_text.filter(|t| !t.trim().is_empty()) else {
            drops.empty_reviews += 1;
            continue;
        };
        let Some(book_id) = asin_map.get(&parsed.asin) else {
            drops.unmapped_identifiers += 1;
            continue;
        };

        reviews.push(Review {
            book_id,
            asin: parsed.asin,
            summary: parsed.summary,
            text,
        });
    }

    info!(
        reviews = reviews.len(),
        unmapped = drops.unmapped_identifiers,
        "Review dump loaded"
    );
    Ok(Cleaned::new(reviews, drops))
}

/// Concatenates the review text of each book, space separated, in input
/// order. Output is ordered by book id.
pub fn digest_reviews(reviews: &[Review]) -> Vec<ReviewDigest> {
    let mut by_book: BTreeMap<i64, ReviewDigest> = BTreeMap::new();

    for review in reviews {
        let digest = by_book.entry(review.book_id).or_insert_with(|| ReviewDigest {
            book_id: review.book_id,
            review_count: 0,
            text: String::new(),
        });
        if digest.review_count > 0 {
            digest.text.push(' ');
        }
        digest.text.push_str(&review.text);
        digest.review_count += 1;
    }

    by_book.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::build_map;

    #[test]
    fn test_load_review_csv_drops_empty_text() {
        let data = "\
2767052,0439023483,Great,Loved every page
2767052,0439023483,Meh,
41865,0316015849,,Not for me
";
        let cleaned = load_review_csv(data.as_bytes()).unwrap();

        assert_eq!(cleaned.value.len(), 2);
        assert_eq!(cleaned.value[0].summary.as_deref(), Some("Great"));
        assert_eq!(cleaned.value[1].summary, None);
        assert_eq!(cleaned.drops.empty_reviews, 1);
    }

    #[test]
    fn test_load_review_dump_maps_asin() {
        let map = build_map(vec![("0439023483".to_string(), Some("2767052".to_string()))], None).value;
        let dump = r#"{"reviewerID": "A1", "asin": "0439023483", "reviewText": "Gripping", "summary": "Wow", "overall": 5.0}

{"reviewerID": "A2", "asin": "B000UNKNOWN", "reviewText": "Fine", "overall": 3.0}
{"reviewerID": "A3", "asin": "0439023483", "reviewText": "", "overall": 1.0}
"#;
        let cleaned = load_review_dump(dump.as_bytes(), &map).unwrap();

        assert_eq!(cleaned.value.len(), 1);
        assert_eq!(cleaned.value[0].book_id, 2767052);
        assert_eq!(cleaned.value[0].summary.as_deref(), Some("Wow"));
        assert_eq!(cleaned.drops.unmapped_identifiers, 1);
        assert_eq!(cleaned.drops.empty_reviews, 1);
    }

    #[test]
    fn test_load_review_dump_rejects_malformed_line() {
        let map = IdentifierMap::default();
        let result = load_review_dump("{not json}\n".as_bytes(), &map);
        assert!(matches!(result, Err(PipelineError::Json(_))));
    }

    #[test]
    fn test_digest_reviews_joins_text_per_book() {
        let review = |book_id, text: &str| Review {
            book_id,
            asin: "a".into(),
            summary: None,
            text: text.into(),
        };
        let digests = digest_reviews(&[review(2, "b1"), review(1, "a1"), review(2, "b2")]);

        assert_eq!(
            digests,
            vec![
                ReviewDigest {
                    book_id: 1,
                    review_count: 1,
                    text: "a1".into()
                },
                ReviewDigest {
                    book_id: 2,
                    review_count: 2,
                    text: "b1 b2".into()
                },
            ]
        );
    }
}
