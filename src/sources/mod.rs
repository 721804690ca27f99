//! Loaders for the raw source tables.
//!
//! Each loader declares the columns it requires; a header missing any of
//! them fails fast with [`PipelineError::Schema`]. Unknown columns are
//! ignored and declared optional columns read as empty when absent.

pub mod authors;
pub mod books;
pub mod links;
pub mod ratings;
pub mod reviews;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::identifiers::coerce_id;
use crate::stats::DropCounts;

/// Required columns of a headered source table.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub table: &'static str,
    pub required: &'static [&'static str],
}

impl Schema {
    pub fn check(&self, headers: &csv::StringRecord) -> Result<()> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|col| !headers.iter().any(|h| h.trim() == **col))
            .map(|col| col.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Schema {
                table: self.table,
                missing,
            })
        }
    }
}

/// Opens a source file, transparently decompressing `.gz` files.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(path = %path.display(), gzipped, "Opening source");

    if gzipped {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads a headered CSV table after checking it against `schema`.
pub(crate) fn read_table<R, T>(reader: R, schema: &Schema) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    schema.check(rdr.headers()?)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    debug!(table = schema.table, rows = rows.len(), "Table read");
    Ok(rows)
}

/// Coerces a required id cell, counting the row as dropped when it is
/// empty or not an integer.
pub(crate) fn required_id(
    column: &'static str,
    raw: Option<&str>,
    drops: &mut DropCounts,
) -> Option<i64> {
    match raw.map(|r| coerce_id(column, r)) {
        Some(Ok(id)) => Some(id),
        Some(Err(e)) => {
            debug!(error = %e, "Dropping row with unparseable id");
            drops.unparseable_ids += 1;
            None
        }
        None => {
            drops.unparseable_ids += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::io::Write;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    const SCHEMA: Schema = Schema {
        table: "demo",
        required: &["a", "b"],
    };

    #[test]
    fn test_schema_check_passes_with_extra_columns() {
        let headers = csv::StringRecord::from(vec!["b", "extra", "a"]);
        assert!(SCHEMA.check(&headers).is_ok());
    }

    #[test]
    fn test_schema_check_reports_every_missing_column() {
        let headers = csv::StringRecord::from(vec!["extra"]);
        match SCHEMA.check(&headers) {
            Err(PipelineError::Schema { table, missing }) => {
                assert_eq!(table, "demo");
                assert_eq!(missing, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_required_id_counts_failures() {
        let mut drops = DropCounts::default();
        assert_eq!(required_id("id", Some("5"), &mut drops), Some(5));
        assert_eq!(required_id("id", Some("x"), &mut drops), None);
        assert_eq!(required_id("id", None, &mut drops), None);
        assert_eq!(drops.unparseable_ids, 2);
    }

    #[test]
    fn test_open_source_reads_gzip() {
        let path = temp_path("reading_diversity_test_open.csv.gz");
        let _ = fs::remove_file(&path);

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"a,b\n1,2\n").unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let mut content = String::new();
        open_source(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "a,b\n1,2\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_source_reads_plain_file() {
        let path = temp_path("reading_diversity_test_open_plain.csv");
        fs::write(&path, "a,b\n").unwrap();

        let mut content = String::new();
        open_source(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "a,b\n");

        fs::remove_file(&path).unwrap();
    }
}
