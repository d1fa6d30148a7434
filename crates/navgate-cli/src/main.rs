//! navgate CLI - drive the navigation policy engine from a terminal
//!
//! Usage:
//!   navgate check URL...              Classify URLs
//!   navgate browse script.txt         Replay navigations, prompting on the terminal
//!   navgate browse --assume stay      Replay navigations from stdin, answering every prompt
//!   navgate defaults                  Print the built-in configuration

mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use navgate::gate::{FixedSurface, UserChoice};
use navgate::{EngineConfig, FrameKind, NavigationOutcome, Navigator};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::terminal::TerminalSurface;

/// navgate - decide which navigations need the user's confirmation
#[derive(Parser, Debug)]
#[command(name = "navgate")]
#[command(about = "Navigation policy engine with user-confirmed deeplinks")]
struct Args {
    /// JSON config file (defaults to the built-in deeplink rules)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify URLs and show the deciding rule
    Check {
        /// URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Replay navigation attempts through a browsing session
    ///
    /// Each line is a URL (main frame) or `sub URL` (sub-frame). Blank lines
    /// and lines starting with `#` are skipped.
    Browse {
        /// File with one navigation per line (stdin if omitted)
        script: Option<PathBuf>,

        /// Answer every prompt with this choice instead of asking
        #[arg(long, value_enum)]
        assume: Option<Answer>,

        /// Print outcomes as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in configuration as JSON
    Defaults,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Answer {
    Stay,
    Leave,
}

impl From<Answer> for UserChoice {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Stay => UserChoice::Stay,
            Answer::Leave => UserChoice::Leave,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Check { urls } => check(config, &urls),
        Command::Browse {
            script,
            assume,
            json,
        } => browse(config, script.as_deref(), assume, json).await,
        Command::Defaults => {
            println!("{}", EngineConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn check(config: EngineConfig, urls: &[String]) -> anyhow::Result<()> {
    let navigator = Navigator::configure(config).context("invalid config")?;

    for url in urls {
        match navigator.evaluate(url) {
            Ok(eval) => println!("{}\t{}\t{}", eval.classification, eval.rule, url),
            Err(e) => println!("allow\t{e}\t{url}"),
        }
    }
    Ok(())
}

async fn browse(
    config: EngineConfig,
    script: Option<&Path>,
    assume: Option<Answer>,
    json: bool,
) -> anyhow::Result<()> {
    let lines = match script {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            if assume.is_none() {
                bail!("reading navigations from stdin requires --assume");
            }
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            buf
        }
    };

    let navigator = Navigator::configure(config).context("invalid config")?;
    let session = match assume {
        Some(answer) => navigator.open_session(FixedSurface::new(answer.into())),
        None => navigator.open_session(TerminalSurface::new()),
    };

    for (frame, target) in lines.lines().filter_map(parse_line) {
        let outcome = session.on_navigation_attempt(target, frame).await;
        report(target, &outcome, json)?;
    }

    if json {
        println!("{}", serde_json::to_string(&session.log_snapshot())?);
    } else {
        println!("\nNavigation log:");
        for (i, url) in session.log_snapshot().iter().enumerate() {
            println!("{i:>4}  {url}");
        }
    }
    Ok(())
}

fn parse_line(line: &str) -> Option<(FrameKind, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match line.strip_prefix("sub ") {
        Some(rest) => Some((FrameKind::SubFrame, rest.trim())),
        None => Some((FrameKind::MainFrame, line)),
    }
}

fn report(target: &str, outcome: &NavigationOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
        return Ok(());
    }

    let how = match (&outcome.evaluation, outcome.prompted) {
        (None, _) => "unparseable".to_string(),
        (Some(_), true) => "after prompt".to_string(),
        (Some(eval), false) => eval.rule.to_string(),
    };
    println!("{}\t{}\t{}", outcome.verdict, how, target);
    Ok(())
}
