use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use feedsift::browser::{Browser, ReplayBrowser};
use feedsift::config::{non_negative_secs, Config};
use feedsift::extract::PostExtractor;
use feedsift::output::terminal;
use feedsift::pipeline::{backfill, ingest, session, IngestOptions};
use feedsift::report::{self, ReportOptions, DEFAULT_TOP_AUTHORS};
use feedsift::store::{CsvStore, StoreError};

/// feedsift: collect feed posts, classify their sentiment, report on them.
///
/// Posts are appended to a CSV store as they are found; re-running resumes
/// where the store left off without writing duplicates.
#[derive(Parser)]
#[command(name = "feedsift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect posts from a search results feed into the store
    Scrape {
        /// Search results URL (overrides FEEDSIFT_SEARCH_URL)
        #[arg(long)]
        url: Option<String>,

        /// CSV store path (overrides FEEDSIFT_STORE)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Netscape cookie file (overrides FEEDSIFT_COOKIES)
        #[arg(long)]
        cookies: Option<PathBuf>,

        /// Replay captured .html snapshots from this directory instead of a live browser
        #[arg(long, value_name = "DIR")]
        replay: Option<PathBuf>,

        /// Stop after this many new posts
        #[arg(long)]
        max_posts: Option<usize>,

        /// Stop after this many scrolls
        #[arg(long)]
        max_scrolls: Option<usize>,

        /// Stop after this many scrolls in a row without a new post
        #[arg(long)]
        max_stagnant: Option<usize>,

        /// Seconds to wait after each scroll
        #[arg(long)]
        settle_secs: Option<f64>,

        /// Start a new store instead of resuming the existing one
        #[arg(long)]
        fresh: bool,

        /// Don't write the sentiment report afterwards
        #[arg(long)]
        no_report: bool,
    },

    /// Generate the sentiment report for a store
    Report {
        /// CSV store path (defaults to FEEDSIFT_STORE)
        store: Option<PathBuf>,

        /// Report path (default: <store>_sentiment_report.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the per-post section
        #[arg(short, long)]
        detailed: bool,

        /// Fill in missing sentiment before reporting
        #[arg(short, long)]
        update: bool,

        /// Skip the backup when updating
        #[arg(long)]
        no_backup: bool,

        /// Number of authors in the top-authors table
        #[arg(long, default_value_t = DEFAULT_TOP_AUTHORS)]
        top: usize,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill in missing sentiment values in a store
    Update {
        /// CSV store path (defaults to FEEDSIFT_STORE)
        store: Option<PathBuf>,

        /// Skip the backup copy
        #[arg(long)]
        no_backup: bool,
    },

    /// Show store status (size, post count, last collection, sentiment mix)
    Status {
        /// CSV store path (defaults to FEEDSIFT_STORE)
        store: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feedsift=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            url,
            store,
            cookies,
            replay,
            max_posts,
            max_scrolls,
            max_stagnant,
            settle_secs,
            fresh,
            no_report,
        } => {
            let mut config = Config::load()?;
            if url.is_some() {
                config.search_url = url;
            }
            if let Some(store) = store {
                config.store_path = store;
            }
            if let Some(cookies) = cookies {
                config.cookies_path = cookies;
            }
            if let Some(n) = max_posts {
                config.limits.max_posts = n;
            }
            if let Some(n) = max_scrolls {
                config.limits.max_scrolls = n;
            }
            if let Some(n) = max_stagnant {
                config.limits.max_stagnant = n;
            }
            if let Some(secs) = settle_secs {
                config.settle = non_negative_secs("--settle-secs", secs)?;
            }

            let store = CsvStore::new(&config.store_path);
            let extractor = PostExtractor::new(config.name_dedup);
            let classifier = config.sentiment.classifier();
            info!(engine = classifier.engine_name(), "Sentiment classifier ready");

            let mut browser: Box<dyn Browser> = match &replay {
                Some(dir) => {
                    println!("Replaying snapshots from {}...", dir.display());
                    let mut browser: Box<dyn Browser> = Box::new(ReplayBrowser::from_dir(dir)?);
                    if let Some(url) = &config.search_url {
                        session::open_search(browser.as_mut(), url, Duration::ZERO).await?;
                    }
                    browser
                }
                None => {
                    println!("Starting browser session...");
                    open_live_browser(&config).await?
                }
            };

            let ledger = ingest::prepare_store(&store, !fresh);
            let mut ledger = match ledger {
                Ok(ledger) => ledger,
                Err(e) => {
                    close_browser(browser.as_mut()).await;
                    return Err(e);
                }
            };
            if !ledger.is_empty() {
                println!("Resuming: {} posts already in {}", ledger.len(), store.path().display());
            }

            let opts = IngestOptions {
                limits: config.limits,
                settle: config.settle,
                echo: true,
                ..Default::default()
            };

            println!("Collecting posts...");
            let result = ingest::run(
                browser.as_mut(),
                &extractor,
                &classifier,
                &store,
                &mut ledger,
                &opts,
            )
            .await;
            close_browser(browser.as_mut()).await;
            let summary = result?;

            terminal::display_ingest_summary(&summary, store.path());

            if !no_report {
                let out = report::default_report_path(store.path());
                match report::generate(&store, &out, &ReportOptions::default()) {
                    Ok(stats) => terminal::display_report_summary(&stats, &out),
                    Err(e) if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::Empty(_))) => {
                        println!("\nNo posts in the store yet, skipping the report.");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Commands::Report {
            store,
            output,
            detailed,
            update,
            no_backup,
            top,
            json,
        } => {
            let config = Config::load()?;
            let store = CsvStore::new(store.unwrap_or(config.store_path.clone()));

            if update {
                println!("Updating sentiment in {}...", store.path().display());
                let classifier = config.sentiment.classifier();
                let summary = backfill::run(&store, &classifier, !no_backup)?;
                terminal::display_backfill_summary(&summary);
            }

            let out = output.unwrap_or_else(|| report::default_report_path(store.path()));
            let opts = ReportOptions {
                detailed,
                top_authors: top,
            };
            let stats = report::generate(&store, &out, &opts)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                terminal::display_report_summary(&stats, &out);
            }
        }

        Commands::Update { store, no_backup } => {
            let config = Config::load()?;
            let store = CsvStore::new(store.unwrap_or(config.store_path.clone()));
            let classifier = config.sentiment.classifier();

            println!("Updating sentiment in {}...", store.path().display());
            let summary = backfill::run(&store, &classifier, !no_backup)?;
            terminal::display_backfill_summary(&summary);
            println!("\n{}", "Update complete.".bold());
        }

        Commands::Status { store } => {
            let config = Config::load()?;
            let store = CsvStore::new(store.unwrap_or(config.store_path.clone()));
            feedsift::status::show(&store)?;
        }
    }

    Ok(())
}

/// Start a live browser, restore the session from cookies and open the
/// search results page.
async fn open_live_browser(config: &Config) -> Result<Box<dyn Browser>> {
    let search_url = config.require_search_url()?;
    config.require_cookies()?;

    #[cfg(feature = "webdriver")]
    {
        let cookies = feedsift::browser::load_cookies(&config.cookies_path)?;
        info!(cookies = cookies.len(), "Loaded cookie file");

        let mut browser: Box<dyn Browser> = Box::new(
            feedsift::browser::WebDriverBrowser::connect(&config.webdriver_url).await?,
        );
        let opts = session::SessionOptions::new(config.home_url.clone(), config.login_timeout);
        session::bootstrap(browser.as_mut(), &cookies, &opts).await?;
        println!("  {} Logged in", "✓".green());

        if let Err(e) = session::open_search(browser.as_mut(), search_url, config.nav_settle).await {
            close_browser(browser.as_mut()).await;
            return Err(e);
        }
        return Ok(browser);
    }

    #[cfg(not(feature = "webdriver"))]
    {
        let _ = search_url;
        anyhow::bail!(
            "Live scraping needs the 'webdriver' feature, which is not compiled in.\n\
             Rebuild with: cargo build --features webdriver\n\
             Or pass --replay DIR to collect from captured snapshots."
        );
    }
}

async fn close_browser(browser: &mut dyn Browser) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close browser");
    }
}
