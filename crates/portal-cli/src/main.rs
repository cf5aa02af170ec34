//! `portal`: command-line client for the services portal.
//!
//! # Usage
//!
//! ```text
//! portal --url https://portal.example.com/api --token $TOKEN dashboard
//! portal --config ~/.config/portal/portal.toml service 42
//! portal history 42 --as-of 2025-03-15
//! portal shell
//! ```

mod app;
mod client;
mod scope;
mod settings;
mod ui;

#[cfg(test)]
mod testing;

use std::{future::Future, io::Write as _, path::PathBuf};

use anyhow::{Context, Result};
use app::App;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::ApiClient;
use portal_core::{
  account::NewSupportRequest,
  lenient::parse_api_date,
  service::ServiceId,
};
use settings::Settings;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "portal", version, about = "Client portal for your services")]
struct Cli {
  /// Path to a TOML config file (base_url, token, timeout_secs).
  #[arg(short, long, value_name = "FILE", default_value = "portal.toml")]
  config: PathBuf,

  /// Base URL of the portal API.
  #[arg(long, env = "PORTAL_URL")]
  url: Option<String>,

  /// Bearer token issued at login.
  #[arg(long, env = "PORTAL_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Request timeout in seconds.
  #[arg(long)]
  timeout: Option<u64>,

  /// Evaluate statuses at this date instead of now (YYYY-MM-DD or RFC 3339).
  #[arg(long, global = true, value_name = "DATE", value_parser = parse_as_of)]
  as_of: Option<DateTime<Utc>>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  #[command(flatten)]
  Screen(Screen),
  /// Interactive session; timelines stay cached until `refresh`. Ctrl-C
  /// abandons a running screen, or leaves when idle at the prompt.
  Shell,
}

#[derive(Subcommand, Debug)]
enum Screen {
  /// Summary counts and every service with its current status.
  Dashboard,
  /// All assigned services.
  Services,
  /// One service: effective period, status, and timeline history.
  Service { id: String },
  /// Timeline and maintenance history of one service.
  History { id: String },
  /// Open a support request.
  Support {
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
    /// Service the request is about.
    #[arg(long)]
    service: Option<String>,
  },
}

/// One line typed at the shell prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
  #[command(subcommand)]
  command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
  #[command(flatten)]
  Screen(Screen),
  /// Forget cached timelines.
  Refresh,
  /// Leave the shell (Ctrl-D also works).
  #[command(alias = "exit")]
  Quit,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
  parse_api_date(raw).map_err(|e| e.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // CLI flags override the environment, which overrides the config file.
  let mut settings = Settings::load(&cli.config)?;
  if let Some(url) = cli.url {
    settings.base_url = url;
  }
  if let Some(token) = cli.token {
    settings.token = Some(token);
  }
  if let Some(timeout) = cli.timeout {
    settings.timeout_secs = timeout;
  }

  let client = ApiClient::new(settings.api_config()).context("creating API client")?;
  let mut app = App::new(client);

  match cli.command {
    Command::Screen(screen) => {
      let now = cli.as_of.unwrap_or_else(Utc::now);
      match run_screen(&app, screen, now).await? {
        Some(text) => print!("{text}"),
        None => tracing::info!("cancelled"),
      }
    }
    Command::Shell => shell(&mut app, cli.as_of).await?,
  }

  if app.degraded_fetches() > 0 {
    tracing::info!(
      failed = app.degraded_fetches(),
      "some timelines could not be loaded; showing original dates"
    );
  }

  Ok(())
}

/// Load and render one screen. `Ok(None)` when interrupted with Ctrl-C.
async fn run_screen(app: &App, screen: Screen, now: DateTime<Utc>) -> Result<Option<String>> {
  let scope = app.scope().clone();
  let interrupt = tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      scope.close();
    }
  });

  let output = match screen {
    Screen::Dashboard => app.dashboard(now).await.map(|v| v.map(|v| ui::dashboard(&v))),
    Screen::Services => app
      .services(now)
      .await
      .map(|s| s.map(|s| ui::service_list::render(&s))),
    Screen::Service { id } => app
      .service(&ServiceId::from(id), now)
      .await
      .map(|d| d.map(|d| ui::service_detail::render(&d))),
    Screen::History { id } => app
      .history(&ServiceId::from(id), now)
      .await
      .map(|h| h.map(|h| ui::service_detail::history(&h))),
    Screen::Support { subject, message, service } => app
      .submit_support(NewSupportRequest {
        subject,
        message,
        service_id: service.map(ServiceId::from),
      })
      .await
      .map(|ticket| Some(format!("Support request #{} submitted.\n", ticket.id))),
  };

  interrupt.abort();
  output
}

// ─── Shell ────────────────────────────────────────────────────────────────────

async fn shell(app: &mut App, as_of: Option<DateTime<Utc>>) -> Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    print!("portal> ");
    std::io::stdout().flush().ok();

    let interrupt = async {
      if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
      }
    };
    let Some(line) = next_command(&mut lines, interrupt).await? else {
      println!();
      break;
    };
    if line.trim().is_empty() {
      continue;
    }

    let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
      Ok(parsed) => parsed,
      Err(e) => {
        eprint!("{e}");
        continue;
      }
    };

    match parsed.command {
      ShellCommand::Quit => break,
      ShellCommand::Refresh => {
        app.refresh();
        println!("Timelines will be reloaded.");
      }
      ShellCommand::Screen(screen) => {
        app.navigate();
        let now = as_of.unwrap_or_else(Utc::now);
        match run_screen(app, screen, now).await {
          Ok(Some(text)) => print!("{text}"),
          Ok(None) => println!("(cancelled)"),
          Err(e) => eprintln!("error: {e:#}"),
        }
      }
    }
  }

  Ok(())
}

/// Next line typed at the prompt, or `None` on EOF or when `interrupt`
/// fires first.
async fn next_command<R: AsyncBufRead + Unpin>(
  lines: &mut Lines<R>,
  interrupt: impl Future<Output = ()>,
) -> Result<Option<String>> {
  tokio::select! {
    line = lines.next_line() => line.context("reading stdin"),
    () = interrupt => Ok(None),
  }
}
