//! Output formatting and persistence for pipeline tables.
//!
//! Supports a logged summary, JSON serialization, CSV overwrite and CSV
//! append.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::UserReport;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Logs one line per group with its share of the user's reading.
pub fn print_summary(report: &UserReport) {
    for group in &report.groups {
        info!(
            user_id = report.user_id,
            race = %group.race,
            gender = %group.gender,
            distinct_count = group.distinct_count,
            "{:.2}%",
            group.percentage * 100.0
        );
    }
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` to a new CSV file at `path`, replacing any existing file.
pub fn write_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV");
    let mut writer = WriterBuilder::new().from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::GroupCount;
    use crate::sources::authors::{Gender, Race};
    use crate::stats::DropCounts;
    use chrono::Utc;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn report() -> UserReport {
        UserReport {
            user_id: 2624891,
            generated_at: Utc::now(),
            rated_books: 3,
            groups: vec![
                GroupCount {
                    race: Race::Black,
                    gender: Gender::Female,
                    distinct_count: 1,
                    percentage: 0.25,
                },
                GroupCount {
                    race: Race::NativeAmerican,
                    gender: Gender::Male,
                    distinct_count: 3,
                    percentage: 0.75,
                },
            ],
            drops: DropCounts::default(),
        }
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        print_summary(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
    }

    #[test]
    fn test_write_records_replaces_file() {
        let path = temp_path("reading_diversity_test_write.csv");
        let _ = fs::remove_file(&path);

        let rows = report().rows();
        write_records(&path, &rows).unwrap();
        write_records(&path, &rows[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("generated_at,user_id,race,gender"));
        assert!(lines[1].contains(",BLACK,FEMALE,1,0.25"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("reading_diversity_test_append.csv");
        let _ = fs::remove_file(&path);

        let rows = report().rows();
        append_records(&path, &rows).unwrap();
        append_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 rows per append
        assert_eq!(content.lines().count(), 5);
        assert!(content.contains("NATIVE AMERICAN"));

        fs::remove_file(&path).unwrap();
    }
}
