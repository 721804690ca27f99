//! Mapping external identifiers (ISBN, ASIN, foreign catalog ids) onto
//! canonical book ids.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::stats::{Cleaned, DropCounts};

/// Lookup from an external identifier to a canonical book id.
///
/// Duplicate keys resolve to the last row seen. Source data carries the same
/// ISBN across several editions, and the later row in the export wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdentifierMap {
    entries: HashMap<String, i64>,
}

impl IdentifierMap {
    pub fn get(&self, key: &str) -> Option<i64> {
        self.entries.get(key.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads an integer out of raw text.
///
/// Integral float text such as `"1234.0"` is accepted since exports that
/// contain blanks in an id column tend to write the whole column as floats.
pub fn coerce_id(column: &'static str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(PipelineError::TypeCoercion {
            column,
            value: raw.to_string(),
        }),
    }
}

/// Builds an [`IdentifierMap`] from `(key, canonical_id)` rows.
///
/// Rows without a canonical id, with a canonical id that is not an integer,
/// or (when `allowed` is given) with a canonical id outside `allowed` are
/// dropped and counted. A later row with the same key replaces an earlier one.
pub fn build_map<I>(rows: I, allowed: Option<&HashSet<i64>>) -> Cleaned<IdentifierMap>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    let mut drops = DropCounts::default();
    let mut entries = HashMap::new();

    for (key, raw) in rows {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            drops.missing_canonical_id += 1;
            continue;
        };

        let canonical = match coerce_id("canonical_id", &raw) {
            Ok(id) => id,
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping identifier row");
                drops.unparseable_ids += 1;
                continue;
            }
        };

        if let Some(allowed) = allowed {
            if !allowed.contains(&canonical) {
                drops.outside_allow_set += 1;
                continue;
            }
        }

        if entries.insert(key.trim().to_string(), canonical).is_some() {
            drops.overwritten_keys += 1;
        }
    }

    debug!(
        entries = entries.len(),
        overwritten = drops.overwritten_keys,
        "Identifier map built"
    );

    Cleaned::new(IdentifierMap { entries }, drops)
}

/// Loads the headerless `isbn,best_book_id` file into an [`IdentifierMap`].
pub fn load_isbn_map<R: Read>(
    reader: R,
    allowed: Option<&HashSet<i64>>,
) -> Result<Cleaned<IdentifierMap>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() < 2 {
            return Err(PipelineError::Schema {
                table: "isbn_map",
                missing: vec!["best_book_id".to_string()],
            });
        }
        let canonical = Some(record[1].to_string()).filter(|s| !s.is_empty());
        rows.push((record[0].to_string(), canonical));
    }

    Ok(build_map(rows, allowed))
}
