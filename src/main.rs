use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use points_tracker::commands::{Invocation, LedgerService};
use points_tracker::config::{EventsConfig, TrackerConfig};
use points_tracker::events::EventsFeed;
use points_tracker::http_client::http_client;
use points_tracker::render::{render, welcome_message};
use points_tracker::report::FailureReporter;
use points_tracker::sheet_client::SheetClient;

/// Notices go to stdout next to the replies; maintainer diagnostics go to the
/// log tagged with the contact id.
struct ConsoleReporter {
    contact: Option<String>,
}

impl FailureReporter for ConsoleReporter {
    fn notify_user(&self, notice: &str) {
        println!("{notice}");
    }

    fn notify_maintainer(&self, diagnostic: &str) {
        match &self.contact {
            Some(contact) => warn!(contact = %contact, "{diagnostic}"),
            None => warn!("no maintainer contact configured: {diagnostic}"),
        }
    }
}

enum ConsoleLine {
    Command(Invocation),
    Joined { user: String },
}

/// `"<user> [guild]: !command args"`, a bare `"!command args"`, or
/// `"<user> joined"` for a new member.
fn parse_line(line: &str) -> Option<ConsoleLine> {
    let line = line.trim();
    if let Some(user) = line.strip_suffix(" joined") {
        let user = user.trim();
        if !user.is_empty() && !user.contains(char::is_whitespace) && !user.starts_with('!') {
            return Some(ConsoleLine::Joined {
                user: user.to_string(),
            });
        }
    }
    let (header, content) = match line.split_once(": ") {
        Some((header, content)) if !header.starts_with('!') => (header, content),
        _ => ("console", line),
    };
    if !content.starts_with('!') {
        return None;
    }
    let mut ids = header.split_whitespace();
    let user = ids.next().unwrap_or("console");
    let guild = ids.next();
    Some(ConsoleLine::Command(Invocation::from_message(user, guild, content)))
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        error!("command task failed: {err}");
    }
}

/// Collects every task that has already finished; returns how many.
fn drain_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = tasks.try_join_next() {
        log_join(joined);
        reaped += 1;
    }
    reaped
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let json_output = std::env::args().any(|arg| arg == "--json");

    let config = TrackerConfig::from_env().context("points tracker config")?;
    let reporter = Arc::new(ConsoleReporter {
        contact: config.maintainer_contact.clone(),
    });
    let sheet_link = config.sheet_link();
    let client = SheetClient::new(config)?;
    let mut service = LedgerService::new(client, sheet_link);
    match EventsConfig::from_env() {
        Some(events_config) => {
            service = service.with_events(EventsFeed::new(events_config, http_client()?.clone()));
        }
        None => info!("contentful credentials missing; !events disabled"),
    }
    let service = Arc::new(service);
    info!("ready; reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        drain_finished(&mut tasks);
        let invocation = match parse_line(&line) {
            Some(ConsoleLine::Command(invocation)) => invocation,
            Some(ConsoleLine::Joined { user }) => {
                println!("{}", welcome_message(&format!("@{user}")));
                continue;
            }
            None => continue,
        };
        let service = Arc::clone(&service);
        let reporter = Arc::clone(&reporter);
        tasks.spawn(async move {
            let outcome = service
                .handle(&invocation, reporter.as_ref(), Instant::now())
                .await;
            if json_output {
                match serde_json::to_string(&outcome) {
                    Ok(json) => println!("{json}"),
                    Err(err) => error!("failed to encode outcome: {err}"),
                }
            } else if let Some(reply) = render(&outcome, &format!("@{}", invocation.user)) {
                println!("{reply}");
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        log_join(joined);
    }
    Ok(())
}
