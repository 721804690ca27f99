//! Joining the catalog tables and breaking a user's reading down by author
//! demographics.
//!
//! [`classify`] merges books, author links and classified authors into one
//! table; [`aggregate`] counts the distinct author-book pairs a user has
//! rated per (race, gender) group; [`analyzer`] wires both to the loaders and
//! the review API.

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod types;

pub use aggregate::aggregate;
pub use classify::classify;
