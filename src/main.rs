// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so JSON on stdout stays clean)
// 3. Extract the page's links and check them
// 4. Save and print the results
// 5. Exit with proper code (0 = all links work, 1 = broken links, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - link extraction and checking
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - HTTP client settings
mod crawl; // src/crawl/ - fetching the starting page
mod report; // src/report.rs - JSON and terminal output
mod session; // src/session.rs - runs the phases in order

use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;
use tracing_subscriber::EnvFilter;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr. RUST_LOG overrides the default level,
// e.g. RUST_LOG=link_checker=debug shows every individual check
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_checker=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = invalid settings, client setup or saving the report failed
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.checker_config();
    config.validate()?;

    let session = session::run(&config, &cli.url, cli.max_links).await?;

    if let Some(path) = &cli.output {
        report::write_json(path, &session.results)?;
        // Keep stdout for the JSON itself when --json is set
        if cli.json {
            eprintln!("Results saved to {}", path.display());
        } else {
            println!("Results saved to {}", path.display());
        }
    }

    if cli.json {
        println!("{}", report::to_json(&session.results)?);
    } else {
        report::print_summary(&session, cli.verbose);
    }

    if session.summary().broken > 0 {
        Ok(1) // Exit code 1 = broken links found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}
