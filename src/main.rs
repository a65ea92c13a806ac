//! Nanoscope CLI
//!
//! Command-line front end over the loaders:
//! - Load an account page
//! - List representatives
//! - Read a post feed
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nanoscope::state::series;
use nanoscope::{
    AccountLoader, AgeWindow, Config, ExplorerApi, ExplorerClient, FeedId, FeedItems, FeedLoader,
    Filters, LoadRequest, PageState, Projector, RepresentativesLoader, SequenceOutcome,
    TelemetryStat,
};

#[derive(Parser)]
#[command(name = "nanoscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Nano network explorer from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Explorer API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an account page
    Account {
        /// Account address, with or without the nano_ prefix
        address: String,
    },

    /// List representatives
    Reps,

    /// Read a post feed
    Posts {
        /// Feed name (top, announcements, ...)
        feed: String,
        /// Age window in hours
        #[arg(short, long)]
        age: Option<u32>,
        /// Label filter
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_tracing(&config);

    let json = cli.format == "json";
    let api: Arc<dyn ExplorerApi> = Arc::new(
        ExplorerClient::new(config.to_client_config()).context("Failed to build HTTP client")?,
    );

    match cli.command {
        Commands::Account { address } => {
            let request = LoadRequest::for_address(&address)?;
            let projector = Arc::new(Projector::new());
            let loader = AccountLoader::new(
                Arc::clone(&api),
                Arc::clone(&projector),
                config.to_loader_config(),
            );

            let handle = loader.submit(request).await;
            let outcome = handle.finished().await;
            tracing::debug!(?outcome, "Account load finished");

            let page = projector.snapshot();
            if let Some(failure) = page.failure() {
                eprintln!("Failed to load {}: {}", address, failure);
                std::process::exit(1);
            }
            if outcome != SequenceOutcome::Completed {
                eprintln!("Account load did not complete ({:?})", outcome);
                std::process::exit(1);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&page_json(&page))?);
            } else {
                print_account(&page);
            }
        }

        Commands::Reps => {
            let loader = RepresentativesLoader::new(Arc::clone(&api));
            loader.refresh().await??;

            let state = loader.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(state.items())?);
            } else {
                println!("{:<66} {:<20} {:>8}", "Account", "Alias", "Online");
                println!("{}", "-".repeat(96));
                for rep in state.items() {
                    println!(
                        "{:<66} {:<20} {:>8}",
                        rep.account,
                        rep.alias.as_deref().unwrap_or("-"),
                        if rep.is_online { "yes" } else { "no" }
                    );
                }
            }
        }

        Commands::Posts { feed, age, label } => {
            let feed = FeedId::from(feed.as_str());
            let mut filters = Filters::default();
            if let Some(hours) = age {
                filters = filters.age(AgeWindow::from_hours(hours));
            }
            if let Some(label) = label {
                filters = filters.label(label);
            }

            let loader = FeedLoader::new(Arc::clone(&api));
            loader.load(feed.clone(), filters).await.await?;

            let state = loader.snapshot(&feed).await;
            if let Some(failure) = state.failure() {
                eprintln!("Failed to load {} posts: {}", feed, failure);
                std::process::exit(1);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(state.posts())?);
            } else {
                if let Some(label) = state.age_label() {
                    println!("{} ({})", feed, label);
                }
                match state.items() {
                    FeedItems::Posts(posts) => {
                        for post in posts {
                            println!(
                                "{:>5}  {}  [{}]",
                                post.score,
                                post.title,
                                post.source.as_deref().unwrap_or("-")
                            );
                        }
                    }
                    FeedItems::Skeletons(_) | FeedItems::Hidden => println!("No posts"),
                }
            }
        }

        Commands::Config { output } => {
            let content = nanoscope::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nanoscope={}", config.logging.level)));
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

fn page_json(page: &PageState) -> serde_json::Value {
    let summaries: serde_json::Map<String, serde_json::Value> = page
        .summaries()
        .map(|(block_type, slice)| {
            let value = match (&slice.summary, &slice.failure) {
                (Some(summary), _) => serde_json::json!(summary),
                (None, Some(failure)) => serde_json::json!({ "error": failure.to_string() }),
                (None, None) => serde_json::Value::Null,
            };
            (block_type.to_string(), value)
        })
        .collect();

    serde_json::json!({
        "account": page.account(),
        "open": page.open(),
        "is_opened": page.is_opened(),
        "is_representative": page.is_representative(),
        "summaries": summaries,
    })
}

fn print_account(page: &PageState) {
    let Some(account) = page.account() else {
        println!("No data");
        return;
    };

    println!("{:<16} {}", "Account", account.account);
    if let Some(alias) = &account.alias {
        println!("{:<16} {}", "Alias", alias);
    }
    println!("{:<16} {}", "Balance", page.balance().unwrap_or("-"));

    if !page.is_opened() {
        println!("\nThis account has no blocks yet");
        return;
    }

    let meta = &account.account_meta;
    println!("{:<16} {}", "Blocks", meta.block_count);
    println!("{:<16} {}", "Confirmed", meta.confirmation_height);
    println!(
        "{:<16} {}",
        "Representative",
        meta.representative.as_deref().unwrap_or("-")
    );
    if let Some(opened) = page
        .open()
        .and_then(|open| open.open_timestamp)
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
    {
        println!("{:<16} {}", "Opened", opened.format("%Y-%m-%d"));
    }
    if let Some(failure) = page.detail_failure() {
        println!("{:<16} unavailable ({})", "Opened", failure);
    }

    for (block_type, slice) in page.summaries() {
        println!("\n{} summary", block_type);
        println!("{}", "-".repeat(96));
        match (&slice.summary, &slice.failure) {
            (Some(summary), _) if !summary.entries.is_empty() => {
                for entry in &summary.entries {
                    println!(
                        "{:<66} {:>8} {:>20}",
                        entry
                            .destination_alias
                            .as_deref()
                            .unwrap_or(&entry.destination_account),
                        entry.block_count,
                        entry.total_amount.as_deref().unwrap_or("-")
                    );
                }
            }
            (_, Some(failure)) => println!("Failed: {}", failure),
            _ => println!("No data"),
        }
    }

    if page.is_representative() {
        println!("\nTelemetry");
        println!("{}", "-".repeat(32));
        for stat in TelemetryStat::ALL {
            let latest = series(account, stat)
                .last()
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{:<16} {:>15}", stat.label(), latest);
        }
    }
}
