//! Error taxonomy for the ingestion pipeline.
//!
//! Rows dropped by cleaning rules are not errors; they are tallied in
//! [`crate::stats::DropCounts`] instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source table is missing one or more of its required columns.
    #[error("{table}: missing required column(s) {}", missing.join(", "))]
    Schema {
        table: &'static str,
        missing: Vec<String>,
    },

    /// An identifier or numeric field could not be read as an integer.
    #[error("{column}: cannot coerce {value:?} to an integer")]
    TypeCoercion { column: &'static str, value: String },

    /// Fetching or decoding a page of the review API failed.
    #[error("fetching page {page} for user {user_id} failed: {reason}")]
    UpstreamFetch {
        user_id: u64,
        page: u32,
        reason: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = PipelineError::Schema {
            table: "books",
            missing: vec!["book_id".to_string(), "language_code".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "books: missing required column(s) book_id, language_code"
        );
    }

    #[test]
    fn test_upstream_fetch_message() {
        let err = PipelineError::UpstreamFetch {
            user_id: 42,
            page: 3,
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "fetching page 3 for user 42 failed: timed out");
    }
}
