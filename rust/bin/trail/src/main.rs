//! `trail` — walk a topic site from the terminal.
//!
//! Usage:
//!   trail [-c <config.toml>] [--content <listing>] [--start <topic>]
//!
//! Reads commands from stdin (`help` lists them) and prints route changes
//! and discoveries as they happen.

mod config;
mod session;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use trail_core::ContentIndex;

use config::SiteConfig;
use session::{Command, Flow, Session};

/// Trail breadcrumb navigator.
#[derive(Parser, Debug)]
#[command(name = "trail", about = "Trail breadcrumb navigator")]
struct Cli {
    /// Path to site config file.
    #[arg(short = 'c', long = "config", default_value = "trail.toml")]
    config: PathBuf,

    /// Content listing (.json or .toml). Overrides `content` in the config.
    #[arg(long = "content")]
    content: Option<PathBuf>,

    /// Topic to start at. Overrides `start` in the config.
    #[arg(long = "start")]
    start: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with session output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config.display());
    let mut site = SiteConfig::load(&cli.config)?;
    if let Some(content) = cli.content {
        site.content = Some(content);
    }
    if let Some(start) = cli.start {
        site.start = Some(start);
    }

    let content = match &site.content {
        Some(path) => {
            let index = ContentIndex::load(path)?;
            info!("Loaded {} topics from {}", index.len(), path.display());
            Some(index)
        }
        None => None,
    };

    let session = Session::new(&site.start_url(), site.router.clone(), content);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    session.execute(Command::Where, &mut stdout)?;

    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "trail> ")?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            writeln!(stdout)?;
            break;
        };
        if session.handle_line(&line?, &mut stdout)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
