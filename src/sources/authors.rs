//! Author demographics loader and categorical repair.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Schema, read_table, required_id};
use crate::error::Result;
use crate::stats::{Cleaned, DropCounts};

const SCHEMA: Schema = Schema {
    table: "authors",
    required: &["author_id", "race", "gender"],
};

/// Race categories, following the EEO classification.
///
/// Variants are declared in alphabetical order of their labels so the
/// derived ordering matches ordering by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Race {
    #[serde(rename = "ASIAN")]
    Asian,
    #[serde(rename = "BLACK")]
    Black,
    #[serde(rename = "LATINO")]
    Latino,
    #[serde(rename = "MIXED")]
    Mixed,
    #[serde(rename = "NATIVE AMERICAN")]
    NativeAmerican,
    #[serde(rename = "PACIFIC ISLANDER")]
    PacificIslander,
    #[serde(rename = "WHITE")]
    White,
}

impl Race {
    pub const LABELS: &'static [&'static str] = &[
        "ASIAN",
        "BLACK",
        "LATINO",
        "MIXED",
        "NATIVE AMERICAN",
        "PACIFIC ISLANDER",
        "WHITE",
    ];

    pub fn label(self) -> &'static str {
        match self {
            Race::Asian => "ASIAN",
            Race::Black => "BLACK",
            Race::Latino => "LATINO",
            Race::Mixed => "MIXED",
            Race::NativeAmerican => "NATIVE AMERICAN",
            Race::PacificIslander => "PACIFIC ISLANDER",
            Race::White => "WHITE",
        }
    }

    /// Parses an already normalized (upper-case, trimmed) label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "ASIAN" => Some(Race::Asian),
            "BLACK" => Some(Race::Black),
            "LATINO" => Some(Race::Latino),
            "MIXED" => Some(Race::Mixed),
            "NATIVE AMERICAN" => Some(Race::NativeAmerican),
            "PACIFIC ISLANDER" => Some(Race::PacificIslander),
            "WHITE" => Some(Race::White),
            _ => None,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    #[serde(rename = "FEMALE")]
    Female,
    #[serde(rename = "MALE")]
    Male,
}

impl Gender {
    pub const LABELS: &'static [&'static str] = &["FEMALE", "MALE"];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "FEMALE",
            Gender::Male => "MALE",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "FEMALE" => Some(Gender::Female),
            "MALE" => Some(Gender::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize)]
struct AuthorRecord {
    author_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    race: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    about: Option<String>,
    #[serde(default)]
    influences: Option<String>,
    #[serde(default)]
    works_count: Option<String>,
    #[serde(default)]
    hometown: Option<String>,
    #[serde(default)]
    born_at: Option<String>,
    #[serde(default)]
    died_at: Option<String>,
}

/// An author row before categorical repair.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAuthor {
    pub author_id: i64,
    pub name: Option<String>,
    pub race: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub about: Option<String>,
    pub influences: Option<String>,
    pub works_count: Option<String>,
    pub hometown: Option<String>,
    pub born_at: Option<String>,
    pub died_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub author_id: i64,
    pub name: Option<String>,
    pub race: Race,
    pub gender: Gender,
    pub image_url: Option<String>,
    pub about: Option<String>,
    pub influences: Option<String>,
    pub works_count: Option<String>,
    pub hometown: Option<String>,
    pub born_at: Option<String>,
    pub died_at: Option<String>,
}

/// Upper-cases and trims a categorical value. Absent values stay absent.
pub fn upper_strip(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_uppercase())
}

/// Most frequent value of a column, absent values included.
///
/// Ties go to the value seen first. An empty column has no modal value and
/// yields `None`, as does a column where absent values are the majority.
pub fn modal_value(column: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<Option<&str>, (usize, usize)> = HashMap::new();
    for (idx, value) in column.iter().enumerate() {
        let entry = counts.entry(value.as_deref()).or_insert((0, idx));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .and_then(|(value, _)| value.map(str::to_string))
}

/// Returns `value` when it is one of `valid`, otherwise `replacement`.
pub fn repair(value: Option<String>, valid: &[&str], replacement: Option<&str>) -> Option<String> {
    match value {
        Some(v) if valid.contains(&v.as_str()) => Some(v),
        _ => replacement.map(str::to_string),
    }
}

/// Normalizes race and gender, repairs invalid values with each column's
/// modal value, and drops the rows that still lack a valid category.
pub fn classify_authors(raw: Vec<RawAuthor>) -> Cleaned<Vec<Author>> {
    let normalized: Vec<RawAuthor> = raw
        .into_iter()
        .map(|a| RawAuthor {
            race: upper_strip(a.race),
            gender: upper_strip(a.gender),
            ..a
        })
        .collect();

    let races: Vec<Option<String>> = normalized.iter().map(|a| a.race.clone()).collect();
    let genders: Vec<Option<String>> = normalized.iter().map(|a| a.gender.clone()).collect();
    let race_majority = modal_value(&races);
    let gender_majority = modal_value(&genders);
    debug!(?race_majority, ?gender_majority, "Modal categories");

    let mut drops = DropCounts::default();
    let mut authors = Vec::with_capacity(normalized.len());

    for a in normalized {
        let race = repair(a.race, Race::LABELS, race_majority.as_deref())
            .as_deref()
            .and_then(Race::from_label);
        let gender = repair(a.gender, Gender::LABELS, gender_majority.as_deref())
            .as_deref()
            .and_then(Gender::from_label);

        let (Some(race), Some(gender)) = (race, gender) else {
            drops.unclassified_authors += 1;
            continue;
        };

        authors.push(Author {
            author_id: a.author_id,
            name: a.name,
            race,
            gender,
            image_url: a.image_url,
            about: a.about,
            influences: a.influences,
            works_count: a.works_count,
            hometown: a.hometown,
            born_at: a.born_at,
            died_at: a.died_at,
        });
    }

    Cleaned::new(authors, drops)
}

/// Reads the classified author CSV.
pub fn load_authors<R: Read>(reader: R) -> Result<Cleaned<Vec<Author>>> {
    let records: Vec<AuthorRecord> = read_table(reader, &SCHEMA)?;
    let mut drops = DropCounts::default();

    let raw: Vec<RawAuthor> = records
        .into_iter()
        .filter_map(|r| {
            let author_id = required_id("author_id", r.author_id.as_deref(), &mut drops)?;
            Some(RawAuthor {
                author_id,
                name: r.name,
                race: r.race,
                gender: r.gender,
                image_url: r.image_url,
                about: r.about,
                influences: r.influences,
                works_count: r.works_count,
                hometown: r.hometown,
                born_at: r.born_at,
                died_at: r.died_at,
            })
        })
        .collect();

    let (authors, repaired) = classify_authors(raw).into_parts();
    drops.absorb(repaired);

    info!(
        authors = authors.len(),
        unclassified = drops.unclassified_authors,
        "Authors loaded"
    );
    Ok(Cleaned::new(authors, drops))
}
