//! CLI entry point for the reading diversity tool.
//!
//! Provides subcommands for building the classified book table, breaking a
//! Goodreads user's read shelf down by author race and gender, digesting
//! review text, and normalizing bulk rating exports.

use std::ffi::OsStr;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use reading_diversity::analyzers::analyzer::{analyze_user, load_catalog};
use reading_diversity::analyzers::classify;
use reading_diversity::config::{DataConfig, GoodreadsConfig};
use reading_diversity::identifiers::load_isbn_map;
use reading_diversity::infra::goodreads::GoodreadsClient;
use reading_diversity::output::{append_records, print_json, print_summary, write_records};
use reading_diversity::sources::authors::load_authors;
use reading_diversity::sources::books::load_books;
use reading_diversity::sources::links::load_links;
use reading_diversity::sources::open_source;
use reading_diversity::sources::ratings::{load_amazon_ratings, load_goodbooks_ratings};
use reading_diversity::sources::reviews::{digest_reviews, load_review_csv, load_review_dump};
use reading_diversity::stats::DropCounts;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "reading_diversity")]
#[command(about = "Break reading habits down by author race and gender", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join books, author links and classified authors into one table
    Classify {
        /// JSON file naming the source tables (defaults to the data/ layout)
        #[arg(short, long)]
        config: Option<String>,

        /// CSV file to write the classified table to
        #[arg(short, long, default_value = "books_classified.csv")]
        output: String,
    },
    /// Break a Goodreads user's read shelf down by author race and gender
    User {
        /// Goodreads user id
        #[arg(value_name = "USER_ID")]
        user_id: u64,

        /// JSON file naming the source tables (defaults to the data/ layout)
        #[arg(short, long)]
        config: Option<String>,

        /// CSV file to append the report rows to
        #[arg(short, long, default_value = "reports.csv")]
        output: String,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Concatenate review text per canonical book id
    Reviews {
        /// Review export: headerless CSV, or JSON lines when named *.json / *.json.gz
        #[arg(value_name = "FILE")]
        source: String,

        /// JSON file naming the source tables; its ISBN map resolves ASINs in JSON dumps
        #[arg(short, long)]
        config: Option<String>,

        /// CSV file to write the per-book digest to
        #[arg(short, long, default_value = "reviews_by_book.csv")]
        output: String,
    },
    /// Normalize a bulk rating export to (user_id, book_id, rating)
    CatalogRatings {
        /// Which export the file comes from
        #[arg(value_enum)]
        format: RatingFormat,

        /// Ratings file
        #[arg(value_name = "FILE")]
        ratings: String,

        /// goodbooks-10k books.csv, required for the goodbooks format
        #[arg(long)]
        books: Option<String>,

        /// CSV file to write normalized ratings to
        #[arg(short, long, default_value = "ratings.csv")]
        output: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RatingFormat {
    Amazon,
    Goodbooks,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/reading_diversity.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("reading_diversity.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { config, output } => {
            let config = DataConfig::load_or_default(config.as_deref())?;
            run_classify(&config, &output)?;
        }
        Commands::User {
            user_id,
            config,
            output,
            json,
        } => {
            let config = DataConfig::load_or_default(config.as_deref())?;
            let goodreads = GoodreadsConfig::from_env()?;
            let catalog = load_catalog(&config).context("loading catalog")?;
            let client = GoodreadsClient::new(&goodreads)?;

            let report = analyze_user(user_id, &client, &catalog, goodreads.timeout)
                .await
                .with_context(|| format!("analyzing user {user_id}"))?;

            print_summary(&report);
            if json {
                print_json(&report)?;
            }
            append_records(&output, &report.rows())?;
            info!(user_id, output = %output, groups = report.groups.len(), "Report written");
        }
        Commands::Reviews {
            source,
            config,
            output,
        } => {
            let is_dump = source.ends_with(".json") || source.ends_with(".json.gz");
            let cleaned = if is_dump {
                let config = DataConfig::load_or_default(config.as_deref())?;
                let asin_map = load_isbn_map(open_source(&config.isbn_map)?, None)?.value;
                load_review_dump(BufReader::new(open_source(&source)?), &asin_map)?
            } else {
                load_review_csv(open_source(&source)?)?
            };
            cleaned.drops.log("reviews");

            let digests = digest_reviews(&cleaned.value);
            write_records(&output, &digests)?;
            info!(books = digests.len(), output = %output, "Review digest written");
        }
        Commands::CatalogRatings {
            format,
            ratings,
            books,
            output,
        } => {
            let cleaned = match format {
                RatingFormat::Amazon => load_amazon_ratings(open_source(&ratings)?)?,
                RatingFormat::Goodbooks => {
                    let books = books.context("--books is required for the goodbooks format")?;
                    load_goodbooks_ratings(open_source(&ratings)?, open_source(&books)?)?
                }
            };
            cleaned.drops.log("catalog-ratings");

            write_records(&output, &cleaned.value)?;
            info!(ratings = cleaned.value.len(), output = %output, "Ratings written");
        }
    }

    Ok(())
}

/// Loads the catalog tables and writes the classified book table.
#[tracing::instrument(skip(config))]
fn run_classify(config: &DataConfig, output: &str) -> Result<()> {
    let mut drops = DropCounts::default();

    let (books, d) = load_books(open_source(&config.books)?)?.into_parts();
    drops.absorb(d);
    let (authors, d) = load_authors(open_source(&config.authors)?)?.into_parts();
    drops.absorb(d);
    let (links, d) = load_links(open_source(&config.author_books)?)?.into_parts();
    drops.absorb(d);

    let (classified, d) = classify(&links, &authors, &books).into_parts();
    drops.absorb(d);
    drops.log("classify");

    write_records(output, &classified)?;
    info!(rows = classified.len(), output = %output, "Classified table written");
    Ok(())
}
