// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is only one thing this tool does (check the links on one page), so
// unlike a multi-command tool we don't need subcommands: every argument lives
// directly on the Cli struct.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: Arguments the user may leave out
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, CheckerConfig};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-checker",
    version = "0.1.0",
    about = "Checks every link on a web page and reports the broken ones",
    long_about = "link-checker downloads one page, collects all of its http/https links \
                  and checks them concurrently. Broken links are listed first."
)]
pub struct Cli {
    /// URL of the page whose links should be checked
    ///
    /// This is a positional argument (required, no flag needed)
    pub url: String,

    /// Save the results as a JSON array to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of links to check
    #[arg(short, long, default_value_t = config::DEFAULT_MAX_LINKS)]
    pub max_links: usize,

    /// Print one line per checked link
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the results as JSON on stdout instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS", default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of requests in flight at once
    #[arg(long, default_value_t = config::DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Maximum number of requests in flight to the same host
    #[arg(long, default_value_t = config::DEFAULT_PER_HOST_LIMIT)]
    pub per_host_limit: usize,

    /// User-Agent header sent with every request
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Report redirects as-is instead of following them
    #[arg(long)]
    pub no_follow_redirects: bool,

    /// Maximum number of redirects followed per link
    #[arg(long, default_value_t = config::DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

impl Cli {
    /// Builds the checker configuration from the parsed flags.
    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
            max_concurrent: self.max_concurrent,
            per_host_limit: self.per_host_limit,
            follow_redirects: !self.no_follow_redirects,
            max_redirects: self.max_redirects,
            verify_tls: !self.insecure,
        }
    }
}
