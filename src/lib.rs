pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod identifiers;
pub mod infra;
pub mod output;
pub mod parser;
pub mod services;
pub mod sources;
pub mod stats;
