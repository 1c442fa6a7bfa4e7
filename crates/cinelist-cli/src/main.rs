//! cinelist - browse and search the TMDB movie catalog.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use crate::tui::run_movie_browser;
use cinelist_api::catalog::{ListItem, LocalCatalogApi};
use cinelist_api::tmdb::TmdbClient;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print one page of popular movies.
    Popular(PopularArgs),
    /// Print one page of movie search results.
    Search(SearchArgs),
    /// Print the full record of one movie.
    Details(DetailsArgs),
    /// Browse and search movies interactively.
    Browse,
    /// Write a config file with default settings.
    Init(InitArgs),
}

/// Arguments for the `popular` subcommand.
#[derive(clap::Args)]
struct PopularArgs {
    /// Result page (starting at 1).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query.
    #[arg(long)]
    query: String,

    /// Result page (starting at 1).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// TMDB movie ID.
    #[arg(long)]
    id: u64,
}

/// Arguments for the `init` subcommand.
#[derive(clap::Args)]
struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Builds a TMDB client from `TMDB_API_TOKEN` and the config file.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set, the configured base URL
/// is invalid, or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    let mut builder = TmdbClient::builder()
        .api_token(api_token)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .language(&config.tmdb.language);
    if let Some(base_url) = &config.tmdb.base_url {
        let url = Url::parse(base_url)
            .with_context(|| format!("invalid tmdb.base_url in config: {base_url}"))?;
        builder = builder.base_url(url);
    }

    builder.build().context("failed to build TMDB client")
}

/// Logs a page of list items as a table.
fn log_items(items: &[ListItem]) {
    tracing::info!("ID\tYear\tRating\tTitle");
    for item in items {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            item.id,
            item.year
                .map_or_else(|| String::from("----"), |y| y.to_string()),
            if item.is_rated() {
                format!("{:.1}", item.rating)
            } else {
                String::from("--")
            },
            item.title,
        );
    }
}

/// Runs the `popular` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_popular(args: &PopularArgs, config: &AppConfig) -> Result<()> {
    let client = build_tmdb_client(config)?;

    let items = client
        .fetch_page(args.page)
        .await
        .context("TMDB movie/popular request failed")?;

    tracing::info!("Page {}: {} movies", args.page, items.len());
    log_items(&items);

    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the query is blank, the TMDB client fails to build,
/// or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, config: &AppConfig) -> Result<()> {
    if args.query.trim().is_empty() {
        bail!("--query must not be empty");
    }
    let client = build_tmdb_client(config)?;

    let items = client
        .search_page(&args.query, args.page)
        .await
        .context("TMDB search/movie request failed")?;

    tracing::info!(
        "Page {} for {:?}: {} movies",
        args.page,
        args.query,
        items.len()
    );
    log_items(&items);

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, config: &AppConfig) -> Result<()> {
    let client = build_tmdb_client(config)?;

    let detail = client
        .fetch_detail(args.id)
        .await
        .context("TMDB movie details request failed")?;

    tracing::info!(
        "{} ({})",
        detail.title,
        detail
            .year
            .map_or_else(|| String::from("----"), |y| y.to_string())
    );
    if let Some(tagline) = &detail.tagline {
        tracing::info!("  \"{tagline}\"");
    }
    tracing::info!("Original:  {} [{}]", detail.original_title, detail.original_language);
    tracing::info!("Genres:    {}", detail.genres.join(", "));
    tracing::info!(
        "Rating:    {:.1} ({} votes)",
        detail.rating,
        detail.vote_count
    );
    if let Some(runtime) = detail.runtime_minutes {
        tracing::info!("Runtime:   {runtime} min");
    }
    if let Some(director) = &detail.director {
        tracing::info!("Director:  {director}");
    }
    if !detail.cast.is_empty() {
        tracing::info!("Cast:      {}", detail.cast.join(", "));
    }
    if let Some(revenue) = detail.revenue {
        tracing::info!("Revenue:   ${revenue}");
    }
    if let Some(homepage) = &detail.homepage {
        tracing::info!("Homepage:  {homepage}");
    }
    tracing::info!("{}", detail.overview);

    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(config: &AppConfig) -> Result<()> {
    let client = build_tmdb_client(config)?;
    run_movie_browser(client, config.browse.debounce()).await
}

/// Runs the `init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
#[instrument(skip_all)]
fn run_init(args: &InitArgs, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default().save(path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Installs the tracing subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset.
fn init_tracing(default_filter: &str) {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log lines would tear the alternate screen.
    let default_filter = if matches!(cli.command, Commands::Browse) {
        "off"
    } else {
        "info"
    };
    init_tracing(default_filter);

    let config_path = resolve_config_path(cli.dir.as_ref())?;
    if let Commands::Init(args) = &cli.command {
        return run_init(args, &config_path);
    }
    let config = AppConfig::load(&config_path)?;

    match cli.command {
        Commands::Popular(args) => run_popular(&args, &config).await,
        Commands::Search(args) => run_search(&args, &config).await,
        Commands::Details(args) => run_details(&args, &config).await,
        Commands::Browse => run_browse(&config).await,
        Commands::Init(_) => Ok(()),
    }
}
