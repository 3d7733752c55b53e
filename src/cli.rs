//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for catalogr using the `clap` crate,
//! plus the small line grammar used by the interactive `browse` session.
//!
//! # Commands
//!
//! - **search**: one-shot filtered query
//! - **open**: run a shareable query string
//! - **browse**: interactive session driving the query engine (default)
//! - **categories** / **tags**: list the selectable vocabulary
//! - **show**: product detail
//! - **config**: show, locate or initialize the configuration file
//!
//! # Examples
//!
//! ```
//! use catalogr::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["catalogr", "search", "--category", "Nature", "--tag", "neon"]);
//! assert!(matches!(cli.command, Some(Commands::Search(_))));
//! ```

use crate::filters::{FilterState, PriceRange, SortOrder};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sort direction as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortArg {
    /// Cheapest first
    #[default]
    Asc,
    /// Most expensive first
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => Self::Ascending,
            SortArg::Desc => Self::Descending,
        }
    }
}

/// Filter flags of the `search` command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    /// Restrict to one category
    #[arg(short = 'c', long = "category", value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Require a tag (can specify multiple: -t a -t b)
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Case-insensitive name search
    #[arg(short = 'n', long = "name", value_name = "TEXT")]
    pub name: Option<String>,

    /// Lowest price to include
    #[arg(long = "price-from", value_name = "N")]
    pub price_from: Option<u64>,

    /// Highest price to include
    #[arg(long = "price-to", value_name = "N")]
    pub price_to: Option<u64>,

    /// Price sort direction
    #[arg(short = 's', long = "sort", value_enum, default_value_t)]
    pub sort: SortArg,

    /// Page to show
    #[arg(short = 'p', long = "page", value_name = "N", default_value_t = 1)]
    pub page: u32,
}

impl SearchArgs {
    /// Filters described by the flags, inside the catalog's `bounds`
    #[must_use]
    pub fn to_filters(&self, bounds: PriceRange) -> FilterState {
        FilterState::builder(bounds)
            .tags(self.tags.iter().map(String::as_str))
            .price_range(
                self.price_from.unwrap_or(bounds.min()),
                self.price_to.unwrap_or(bounds.max()),
            )
            .search_term(self.name.clone().unwrap_or_default())
            .sort_order(self.sort.into())
            .build()
            .with_category(self.category.clone())
            .normalized()
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the effective configuration to the config file
    Init,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one filtered catalog query
    #[command(visible_alias = "s")]
    Search(SearchArgs),

    /// Run a shareable query string (e.g. "category=Nature&page=2")
    #[command(visible_alias = "o")]
    Open {
        #[arg(value_name = "QUERY_STRING")]
        query: String,
    },

    /// Browse the catalog interactively (default)
    #[command(visible_alias = "b")]
    Browse {
        /// Query string to start from
        #[arg(value_name = "QUERY_STRING")]
        query: Option<String>,
    },

    /// List categories
    Categories,

    /// List tags
    Tags,

    /// Show one product
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "catalogr")]
#[command(about = "Browse a remote product catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Catalog API base URL (overrides config)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to Browse if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Browse { query: None })
    }
}

/// One line of input in an interactive browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// `n`: next page
    Next,
    /// `p`: previous page
    Prev,
    /// `g N`: go to page N
    Page(u32),
    /// `/text`: live search; a bare `/` clears the term
    Search(String),
    /// `c NAME`: select a category, `c` alone clears it
    Category(Option<String>),
    /// `t TAG`: toggle a tag
    Tag(String),
    /// `price MIN MAX`
    Price(u64, u64),
    /// `sort asc|desc`
    Sort(SortOrder),
    /// `apply`: commit the draft
    Apply,
    /// `reset`: discard draft edits
    Reset,
    /// `back`: navigate back in history
    Back,
    /// `url`: print the shareable query string
    Url,
    /// `help` or `?`
    Help,
    /// `q`
    Quit,
}

impl BrowseCommand {
    /// Usage text of the interactive session
    pub const HELP: &'static str = "\
n / p            next / previous page
g N              go to page N
/TEXT            search by name (sent after a short pause)
c [CATEGORY]     set or clear the category (draft)
t TAG            toggle a tag (draft)
price MIN MAX    set the price range (draft)
sort asc|desc    set the price sort (draft)
apply            apply draft filters
reset            discard draft edits
back             go back in history
url              print the shareable query string
q                quit";

    /// Parse one input line
    ///
    /// # Errors
    ///
    /// Returns a message describing the expected form when the line is not a command.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if let Some(term) = line.strip_prefix('/') {
            return Ok(Self::Search(term.to_string()));
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" => Ok(Self::Prev),
            "g" | "page" => rest
                .parse()
                .map(Self::Page)
                .map_err(|_| "usage: g N".to_string()),
            "c" | "category" => Ok(Self::Category((!rest.is_empty()).then(|| rest.to_string()))),
            "t" | "tag" if !rest.is_empty() => Ok(Self::Tag(rest.to_string())),
            "t" | "tag" => Err("usage: t TAG".to_string()),
            "price" => {
                let bounds: Vec<_> = rest.split_whitespace().map(str::parse::<u64>).collect();
                match bounds.as_slice() {
                    [Ok(min), Ok(max)] => Ok(Self::Price(*min, *max)),
                    _ => Err("usage: price MIN MAX".to_string()),
                }
            }
            "sort" => match rest {
                "asc" => Ok(Self::Sort(SortOrder::Ascending)),
                "desc" => Ok(Self::Sort(SortOrder::Descending)),
                _ => Err("usage: sort asc|desc".to_string()),
            },
            "apply" | "a" => Ok(Self::Apply),
            "reset" => Ok(Self::Reset),
            "back" => Ok(Self::Back),
            "url" => Ok(Self::Url),
            "help" | "?" | "h" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (type 'help')")),
        }
    }
}
