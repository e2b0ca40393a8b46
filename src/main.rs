//! # odb
//!
//! Command-line front end for `odb_fetch`: fetch the devotional for a date
//! and print it.
//!
//! ```sh
//! odb 2024 1 1 --language zh-hans
//! ```
//!
//! Exit codes: `0` on success, `2` for usage errors (bad arguments, an
//! impossible date, an unreadable config file or an invalid selector in it),
//! `1` when the post could not be fetched or parsed. Logs go to stderr; set `RUST_LOG=debug` for detail.

use std::fmt::Write;
use std::process::ExitCode;

use clap::Parser;
use odb_fetch::{Config, Odb, OdbError, Post};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

const EXIT_FETCH: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(&args).await {
        Ok(post) => {
            if args.json {
                match serde_json::to_string_pretty(&post) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!(error = %e, "Failed to serialize post");
                        return ExitCode::from(EXIT_FETCH);
                    }
                }
            } else {
                print!("{}", render_text(&post));
            }
            let elapsed = start_time.elapsed();
            info!(millis = elapsed.as_millis() as u64, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("odb: {e}");
            if e.is_usage() {
                ExitCode::from(EXIT_USAGE)
            } else {
                error!(url = e.url().unwrap_or_default(), error = %e, "Failed to fetch post");
                ExitCode::from(EXIT_FETCH)
            }
        }
    }
}

async fn run(args: &Cli) -> Result<Post, OdbError> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let odb = Odb::from_config(&config, args.language)?;
    info!(edition = %args.language, base_url = %odb.edition().base_url, "Accessor ready");
    odb.get_post(args.year, args.month, args.day).await
}

/// Labelled plain-text rendering of a post.
fn render_text(post: &Post) -> String {
    let mut out = String::new();
    writeln!(out, "Date:         {}-{:02}-{:02}", post.year(), post.month(), post.day()).unwrap();
    writeln!(out, "URL:          {}", post.url()).unwrap();
    writeln!(out, "Title:        {}", post.title()).unwrap();
    writeln!(out, "Bible Verse:  {}", post.bible_verse()).unwrap();
    if !post.bible_verse_ref().is_empty() {
        let refs = post
            .bible_verse_ref()
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        writeln!(out, "Reference:    {}", refs).unwrap();
    }
    writeln!(out, "Golden Verse: {}", post.golden_verse()).unwrap();
    for passage in post.passages() {
        writeln!(out, "\n{}", passage).unwrap();
    }
    if !post.poem().is_empty() {
        writeln!(out).unwrap();
        for line in post.poem() {
            writeln!(out, "    {}", line).unwrap();
        }
    }
    writeln!(out, "\nThought:      {}", post.thought()).unwrap();
    out
}
