//! Catalogr CLI application entry point
//!
//! Command-line front end for a remote product catalog. Every listing goes
//! through the same query engine the library exposes, so a query string
//! printed by one command can be pasted into another.
//!
//! # Usage
//!
//! ```bash
//! # Browse interactively (default command)
//! catalogr
//! catalogr browse "category=Nature&page=2"
//!
//! # One-shot search
//! catalogr search --category Nature --tag neon --sort desc
//!
//! # Re-run a shareable query string
//! catalogr open "category=Nature&tags=neon&sort=-price"
//!
//! # Vocabulary and product detail
//! catalogr categories
//! catalogr show 5f0c
//! ```
//!
//! # Configuration
//!
//! Settings are read from the user's config directory
//! (`~/.config/catalogr/config.toml` on Linux) and `CATALOGR_*` environment
//! variables. Log verbosity is controlled with `CATALOGR_LOG`.

use catalogr::{
    CatalogrError,
    api::{CatalogApi, HttpCatalogApi, Product},
    cli::{BrowseCommand, Cli, Commands, ConfigCommands},
    config::CatalogConfig,
    engine::{CatalogDriver, DriverEvent, EngineSettings, ResponseOutcome},
    filters::PriceRange,
    location::{MemoryUrlStore, UrlCodec},
    view::{Pager, ResultsView, format_price},
};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, CatalogrError>;

type Driver = CatalogDriver<HttpCatalogApi, MemoryUrlStore>;

/// Install the stderr log subscriber, filtered by `CATALOGR_LOG`
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CATALOGR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Print the applied filters, the result list and the pager
fn render(driver: &Driver, quiet: bool) {
    let engine = driver.engine();

    if !quiet {
        println!("{} {}", "Filters:".bold(), engine.applied());
    }

    let view = ResultsView::new(engine.results(), engine.status()).quiet(quiet);
    let rendered = view.render();
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    if !quiet && let Some(pager) = Pager::from_metadata(engine.metadata()) {
        println!("{pager}");
    }
}

/// Print the draft filters while they differ from the applied ones
fn render_draft(driver: &Driver) {
    let engine = driver.engine();
    if engine.draft() == engine.applied() {
        println!("{}", "Draft matches applied filters".dimmed());
    } else {
        println!("{} {} {}", "Draft:".yellow(), engine.draft(), "(type 'apply')".dimmed());
    }
}

/// Mount a driver on `query` and wait for its first page
///
/// # Errors
///
/// Returns `CatalogrError::CatalogError` if the vocabulary or the first page cannot be loaded.
async fn mount(api: Arc<HttpCatalogApi>, settings: EngineSettings, query: &str) -> Result<Driver> {
    let mut driver = CatalogDriver::new(api, MemoryUrlStore::new(query), settings);
    driver.mount().await?;
    driver.settle().await;
    Ok(driver)
}

/// Handle `search` and `open`: run a single query and print it
///
/// # Errors
///
/// Returns `CatalogrError` if the query fails.
async fn handle_query_command(
    api: Arc<HttpCatalogApi>,
    settings: EngineSettings,
    query: &str,
    quiet: bool,
) -> Result<()> {
    let driver = mount(api, settings, query).await?;
    render(&driver, quiet);

    if let Some(err) = driver.engine().status().error() {
        return Err(err.clone().into());
    }

    if !quiet {
        println!("{} {}", "Share:".bold(), driver.engine().shareable_query());
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("{} ", ">".cyan().bold());
    io::stdout().flush()
}

/// Apply one interactive command; returns `false` to leave the session
fn handle_browse_line(driver: &mut Driver, store: &MemoryUrlStore, command: BrowseCommand) -> bool {
    match command {
        BrowseCommand::Next => {
            if driver.next_page().is_none() {
                println!("{}", "Already on the last page".dimmed());
            }
        }
        BrowseCommand::Prev => {
            if driver.prev_page().is_none() {
                println!("{}", "Already on the first page".dimmed());
            }
        }
        BrowseCommand::Page(page) => {
            if driver.change_page(page).is_none() {
                println!("{}", "Already on that page".dimmed());
            }
        }
        BrowseCommand::Search(term) => driver.update_search_term(term),
        BrowseCommand::Category(category) => {
            if let Some(name) = &category
                && !driver.engine().vocabulary().categories.contains(name)
            {
                println!("{} unknown category '{name}'", "Warning:".yellow());
            }
            driver.engine_mut().set_draft_category(category);
            render_draft(driver);
        }
        BrowseCommand::Tag(tag) => {
            driver.engine_mut().toggle_draft_tag(&tag);
            render_draft(driver);
        }
        BrowseCommand::Price(min, max) => {
            driver.engine_mut().set_draft_price_range(PriceRange::new(min, max));
            render_draft(driver);
        }
        BrowseCommand::Sort(order) => {
            driver.engine_mut().set_draft_sort(order);
            render_draft(driver);
        }
        BrowseCommand::Apply => {
            if driver.apply_draft().is_none() {
                println!("{}", "Filters unchanged".dimmed());
            }
        }
        BrowseCommand::Reset => {
            driver.engine_mut().reset_draft();
            render_draft(driver);
        }
        BrowseCommand::Back => {
            if store.back() {
                driver.pump_navigation();
            } else {
                println!("{}", "No earlier page in history".dimmed());
            }
        }
        BrowseCommand::Url => println!("{}", driver.engine().shareable_query()),
        BrowseCommand::Help => println!("{}", BrowseCommand::HELP),
        BrowseCommand::Quit => return false,
    }
    true
}

/// Handle the browse command - interactive session over stdin
///
/// Input lines and engine events are processed as they arrive, so a slow
/// response never blocks typing and a superseded one is never shown.
///
/// # Errors
///
/// Returns `CatalogrError` if stdin or stdout fail.
async fn handle_browse_command(
    api: Arc<HttpCatalogApi>,
    settings: EngineSettings,
    query: Option<String>,
    quiet: bool,
) -> Result<()> {
    let store = MemoryUrlStore::new(query.as_deref().unwrap_or_default());
    let mut driver = CatalogDriver::new(api, store.clone(), settings);

    if let Err(err) = driver.mount().await {
        eprintln!("{} {err}", "Error:".red());
    }
    driver.settle().await;
    render(&driver, quiet);
    if !quiet {
        println!("{}", "Type 'help' for commands".dimmed());
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    prompt()?;
                    continue;
                }
                match BrowseCommand::parse(&line) {
                    Ok(command) => {
                        if !handle_browse_line(&mut driver, &store, command) {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message.yellow()),
                }
                prompt()?;
            }
            Some(event) = driver.next_event() => {
                match event {
                    DriverEvent::Response { outcome: ResponseOutcome::Applied, .. } => {
                        println!();
                        render(&driver, quiet);
                        prompt()?;
                    }
                    DriverEvent::PageReset { .. } if !quiet => {
                        let notice = "That page is past the end, loading the last page";
                        println!("\n{}", notice.dimmed());
                        prompt()?;
                    }
                    DriverEvent::SearchCommitted(Some(_)) if !quiet => {
                        let term = &driver.engine().applied().search_term;
                        println!("\n{} \"{term}\"", "Searching".dimmed());
                        prompt()?;
                    }
                    _ => {}
                }
            }
        }
    }

    if !quiet {
        println!("{} {}", "Share:".bold(), driver.engine().shareable_query());
    }
    Ok(())
}

fn print_product(product: &Product) {
    println!("{}", product.name.bold());
    println!("  {:<12}{}", "id:", product.id);
    println!("  {:<12}{}", "price:", format_price(product.price).green());
    if let Some(category) = &product.category_id {
        println!("  {:<12}{category}", "category:");
    }
    if !product.tags.is_empty() {
        println!("  {:<12}{}", "tags:", product.tags.join(", ").cyan());
    }
    if let Some(image) = &product.image {
        println!("  {:<12}{image}", "image:");
    }
    for extra in &product.image_list {
        println!("  {:<12}{extra}", "");
    }
    if let Some(created) = product.created_at {
        println!("  {:<12}{}", "created:", created.format("%Y-%m-%d %H:%M"));
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
}

/// Handle `categories` and `tags`
///
/// # Errors
///
/// Returns `CatalogrError::ApiError` if the request fails.
async fn handle_vocabulary_command(api: &HttpCatalogApi, tags: bool, quiet: bool) -> Result<()> {
    let (label, items) = if tags {
        ("tags", api.tags().await?)
    } else {
        ("categories", api.categories().await?)
    };

    if items.is_empty() && !quiet {
        println!("No {label} found");
    }
    for item in items {
        if quiet {
            println!("{item}");
        } else {
            println!("  {item}");
        }
    }
    Ok(())
}

/// Handle the config subcommands
///
/// # Errors
///
/// Returns `CatalogrError::ConfigError` if the config path cannot be resolved or written.
fn handle_config_command(
    config: &CatalogConfig,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| CatalogrError::InvalidInput(format!("Failed to render config: {e}")))?;
            print!("{rendered}");
        }
        ConfigCommands::Path => println!("{}", CatalogConfig::config_path()?.display()),
        ConfigCommands::Init => {
            let path = config.save()?;
            if !quiet {
                println!("Configuration written to {}", path.display());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    let mut config = CatalogConfig::load()?;
    if let Some(api_url) = &cli.api_url {
        config.api_url.clone_from(api_url);
    }
    config.validate()?;

    let quiet = cli.quiet || config.quiet;
    let command = cli.get_command();

    if let Commands::Config { command } = &command {
        return handle_config_command(&config, command, quiet);
    }

    let api = Arc::new(HttpCatalogApi::new(&config.api_url, config.request_timeout())?);
    let settings = config.engine_settings();

    match command {
        Commands::Search(args) => {
            let codec = UrlCodec::new(settings.price_bounds);
            let query = codec.encode(&args.to_filters(settings.price_bounds), args.page);
            handle_query_command(api, settings, &query, quiet).await?;
        }
        Commands::Open { query } => handle_query_command(api, settings, &query, quiet).await?,
        Commands::Browse { query } => handle_browse_command(api, settings, query, quiet).await?,
        Commands::Categories => handle_vocabulary_command(&api, false, quiet).await?,
        Commands::Tags => handle_vocabulary_command(&api, true, quiet).await?,
        Commands::Show { id } => print_product(&api.product(&id).await?),
        Commands::Config { .. } => {}
    }

    Ok(())
}
