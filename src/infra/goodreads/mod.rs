//! Goodreads review API.

mod client;

pub use client::GoodreadsClient;
