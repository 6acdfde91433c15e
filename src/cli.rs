//! Command-line interface parsing for Placeboard
//!
//! Every flag can also come from the environment (or a `.env` file loaded at
//! start-up), so a deployment can point the client at its backend without
//! wrapping the command line.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::data::api::DEFAULT_API_URL;
use crate::listing::{ImageStrategy, ListingConfig, ListingFilter, RatingStrategy, CARD_WIDTH};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid image strategy: '{0}'. Valid strategies: server-first, title-lookup")]
    InvalidImageStrategy(String),

    #[error("Invalid rating strategy: '{0}'. Valid strategies: reviews, fixed, unrated")]
    InvalidRatingStrategy(String),

    #[error("Invalid default rating: {0}. Must be between 0 and 5")]
    InvalidDefaultRating(f64),

    #[error("Invalid scroll step: must be at least 1 column")]
    InvalidScrollStep,

    #[error("Invalid API URL: '{0}'. Must start with http:// or https://")]
    InvalidApiUrl(String),
}

/// Placeboard - browse places, read and write reviews from the terminal
#[derive(Parser, Debug)]
#[command(name = "placeboard")]
#[command(about = "Terminal client for the places and reviews API")]
#[command(version)]
pub struct Cli {
    /// Base URL of the listings API
    #[arg(long, env = "PLACEBOARD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Columns moved by one card scroll step
    #[arg(long, env = "PLACEBOARD_SCROLL_STEP", default_value_t = CARD_WIDTH)]
    pub scroll_step: u16,

    /// Where card images come from: server-first or title-lookup
    #[arg(long, env = "PLACEBOARD_IMAGE_STRATEGY", default_value = "server-first")]
    pub image_strategy: String,

    /// How card ratings are computed: reviews, fixed or unrated
    #[arg(long, env = "PLACEBOARD_RATING_STRATEGY", default_value = "reviews")]
    pub rating_strategy: String,

    /// Rating shown when no review-based rating is available
    #[arg(long, env = "PLACEBOARD_DEFAULT_RATING", default_value_t = crate::listing::config::DEFAULT_RATING)]
    pub default_rating: f64,

    /// Initial maximum price per night (0 = no limit)
    #[arg(long, value_name = "GOLD", default_value_t = 0)]
    pub max_price: u32,

    /// Initial search query
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Log file path (defaults to the user data directory)
    #[arg(long, env = "PLACEBOARD_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not read or write the offline place snapshot
    #[arg(long)]
    pub no_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_url: String,
    pub listing: ListingConfig,
    /// Filter and search applied to the first render
    pub filter: ListingFilter,
    pub log_file: Option<PathBuf>,
    pub use_snapshots: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            listing: ListingConfig::default(),
            filter: ListingFilter::default(),
            log_file: None,
            use_snapshots: true,
        }
    }
}

/// Parses an image strategy argument
pub fn parse_image_strategy(s: &str) -> Result<ImageStrategy, CliError> {
    ImageStrategy::from_str(s).ok_or_else(|| CliError::InvalidImageStrategy(s.to_string()))
}

/// Parses a rating strategy argument
pub fn parse_rating_strategy(s: &str) -> Result<RatingStrategy, CliError> {
    RatingStrategy::from_str(s).ok_or_else(|| CliError::InvalidRatingStrategy(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if a strategy name or numeric value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_url = cli.api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(CliError::InvalidApiUrl(cli.api_url.clone()));
        }
        if cli.scroll_step == 0 {
            return Err(CliError::InvalidScrollStep);
        }
        if !(0.0..=5.0).contains(&cli.default_rating) {
            return Err(CliError::InvalidDefaultRating(cli.default_rating));
        }

        let listing = ListingConfig {
            card_scroll_delta: cli.scroll_step,
            image_strategy: parse_image_strategy(&cli.image_strategy)?,
            rating_strategy: parse_rating_strategy(&cli.rating_strategy)?,
            default_rating: cli.default_rating,
        };

        Ok(StartupConfig {
            api_url,
            listing,
            filter: ListingFilter::new(cli.max_price, cli.search.as_deref().unwrap_or("")),
            log_file: cli.log_file.clone(),
            use_snapshots: !cli.no_cache,
        })
    }
}
