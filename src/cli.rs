//! Command-line interface definitions for the `odb` binary.
//!
//! Options can also be supplied through environment variables.

use std::path::PathBuf;

use clap::Parser;
use odb_fetch::Language;

/// Fetch an Our Daily Bread devotional and print it.
///
/// # Examples
///
/// ```sh
/// # English post for New Year's Day
/// odb 2024 1 1
///
/// # Traditional Chinese edition as JSON
/// odb 2024 1 1 --language zh-hant --json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Year of the post
    pub year: i32,

    /// Month of the post (1-12)
    pub month: u32,

    /// Day of the month
    pub day: u32,

    /// Language edition of the site
    #[arg(short, long, value_enum, env = "ODB_LANGUAGE", default_value = "en")]
    pub language: Language,

    /// Optional path to a config.yaml overriding editions and HTTP settings
    #[arg(short, long, env = "ODB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the post as JSON instead of labelled text
    #[arg(long)]
    pub json: bool,
}
