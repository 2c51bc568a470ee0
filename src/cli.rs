//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ftcr_core::Scheme;

/// Collect images from direct links or scraped pages.
///
/// Each URL is classified by its file extension: image URLs are fetched
/// directly, anything else is treated as a page and scraped for image links.
#[derive(Parser, Debug)]
#[command(name = "ftcr")]
#[command(author, version, about)]
pub struct Args {
    /// Image or page URLs; a missing scheme gets the default one
    pub urls: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Only accept private IPv4 hosts and IPv6 literals
    #[arg(long)]
    pub lan_only: bool,

    /// Scheme prepended to URLs that have none
    #[arg(long, value_enum)]
    pub scheme: Option<SchemeArg>,

    /// Read defaults from this config file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable the live progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Command-line spelling of [`Scheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    Http,
    Https,
}

impl From<SchemeArg> for Scheme {
    fn from(value: SchemeArg) -> Self {
        match value {
            SchemeArg::Http => Self::Http,
            SchemeArg::Https => Self::Https,
        }
    }
}
