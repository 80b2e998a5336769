use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::cooldown::Cooldowns;
use crate::error::{DataError, FailureCategory};
use crate::events::{EventListing, EventsFeed};
use crate::matcher::find_by_first_name;
use crate::months::{Month, resolve_month};
use crate::points::{
    BreakdownEntry, LEADERBOARD_SIZE, LeaderboardEntry, leaderboard, monthly_breakdown,
    parse_total, total_breakdown,
};
use crate::report::{FailureReporter, report_fetch_failure};
use crate::sheet_client::RangeSource;
use crate::table::{MemberRow, NAME_COLUMN, SheetTable, TabLayout, fetch_table};

/// Longest window returned by `Command::cooldown`.
pub const LONGEST_COOLDOWN: Duration = Duration::from_secs(30);

pub const COMMAND_NAMES: [&str; 5] = ["top", "points", "monthly-points", "points-link", "events"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Top,
    Points { first_name: String },
    MonthlyPoints { first_name: String, month: String },
    PointsLink,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownScope {
    User,
    Guild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    Unknown {
        name: String,
    },
}

impl Command {
    /// `name` may carry the leading `!`; extra arguments are ignored.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, ParseError> {
        let name = name.trim().trim_start_matches('!').to_lowercase();
        let arg = |idx: usize| args.get(idx).map(|a| a.trim()).filter(|a| !a.is_empty());
        match name.as_str() {
            "top" => Ok(Command::Top),
            "points" => {
                let first_name = arg(0).ok_or(ParseError::MissingArgument {
                    command: "points",
                    argument: "first name",
                })?;
                Ok(Command::Points {
                    first_name: first_name.to_string(),
                })
            }
            "monthly-points" => {
                let first_name = arg(0).ok_or(ParseError::MissingArgument {
                    command: "monthly-points",
                    argument: "first name",
                })?;
                let month = arg(1).ok_or(ParseError::MissingArgument {
                    command: "monthly-points",
                    argument: "month",
                })?;
                Ok(Command::MonthlyPoints {
                    first_name: first_name.to_string(),
                    month: month.to_string(),
                })
            }
            "points-link" => Ok(Command::PointsLink),
            "events" => Ok(Command::Events),
            _ => Err(ParseError::Unknown { name: name.clone() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Top => "top",
            Command::Points { .. } => "points",
            Command::MonthlyPoints { .. } => "monthly-points",
            Command::PointsLink => "points-link",
            Command::Events => "events",
        }
    }

    pub fn cooldown(&self) -> (Duration, CooldownScope) {
        match self {
            Command::Top | Command::Points { .. } | Command::MonthlyPoints { .. } => {
                (Duration::from_secs(5), CooldownScope::User)
            }
            Command::Events => (Duration::from_secs(10), CooldownScope::User),
            Command::PointsLink => (LONGEST_COOLDOWN, CooldownScope::Guild),
        }
    }
}

/// One inbound chat command, already split from its prefix and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub user: String,
    pub guild: Option<String>,
    pub command_name: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Splits `"!points jim"` on spaces, skipping empty pieces.
    pub fn from_message(user: &str, guild: Option<&str>, content: &str) -> Self {
        let mut parts = content.trim().split(' ').filter(|p| !p.is_empty());
        let command_name = parts.next().unwrap_or_default().to_string();
        Self {
            user: user.to_string(),
            guild: guild.map(str::to_string),
            command_name,
            args: parts.map(str::to_string).collect(),
        }
    }

    fn cooldown_key(&self, command: &Command, scope: CooldownScope) -> String {
        let scope_key = match scope {
            CooldownScope::User => self.user.as_str(),
            CooldownScope::Guild => self.guild.as_deref().unwrap_or(self.user.as_str()),
        };
        format!("{}:{scope_key}", command.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardResult {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    AllTime,
    Month { key: &'static str, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPointsResult {
    pub name: String,
    pub total: i64,
    pub period: Period,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSubject {
    Member,
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundResult {
    pub queried: String,
    pub subject: LookupSubject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub category: FailureCategory,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Leaderboard(LeaderboardResult),
    MemberPoints(MemberPointsResult),
    NotFound(NotFoundResult),
    Error(ErrorResult),
    PointsLink { url: String },
    Events(EventListing),
    EventsUnavailable,
    Usage {
        command: &'static str,
        argument: &'static str,
    },
    UnknownCommand { name: String },
    CoolingDown { retry_after_secs: u64 },
    /// The fetch failed and the reporter already told the user.
    NoData,
}

pub struct LedgerService<S> {
    source: S,
    sheet_link: String,
    events: Option<EventsFeed>,
    cooldowns: Cooldowns,
}

impl<S: RangeSource> LedgerService<S> {
    pub fn new(source: S, sheet_link: impl Into<String>) -> Self {
        Self {
            source,
            sheet_link: sheet_link.into(),
            events: None,
            cooldowns: Cooldowns::new(LONGEST_COOLDOWN),
        }
    }

    pub fn with_events(mut self, feed: EventsFeed) -> Self {
        self.events = Some(feed);
        self
    }

    /// Parse, apply the cooldown, then run.
    pub async fn handle<R: FailureReporter + ?Sized>(
        &self,
        invocation: &Invocation,
        reporter: &R,
        now: Instant,
    ) -> CommandOutcome {
        let command = match Command::parse(&invocation.command_name, &invocation.args) {
            Ok(command) => command,
            Err(ParseError::MissingArgument { command, argument }) => {
                return CommandOutcome::Usage { command, argument };
            }
            Err(ParseError::Unknown { name }) => return CommandOutcome::UnknownCommand { name },
        };

        let (window, scope) = command.cooldown();
        let key = invocation.cooldown_key(&command, scope);
        if let Err(left) = self.cooldowns.try_acquire(&key, window, now) {
            return CommandOutcome::CoolingDown {
                retry_after_secs: left.as_secs().max(1),
            };
        }

        info!(user = %invocation.user, command = command.name(), "running command");
        self.run(&command, reporter).await
    }

    pub async fn run<R: FailureReporter + ?Sized>(
        &self,
        command: &Command,
        reporter: &R,
    ) -> CommandOutcome {
        match command {
            Command::Top => self.top(reporter).await,
            Command::Points { first_name } => self.total_points(first_name, reporter).await,
            Command::MonthlyPoints { first_name, month } => {
                self.monthly_points(first_name, month, reporter).await
            }
            Command::PointsLink => CommandOutcome::PointsLink {
                url: self.sheet_link.clone(),
            },
            Command::Events => self.events(reporter).await,
        }
    }

    async fn top<R: FailureReporter + ?Sized>(&self, reporter: &R) -> CommandOutcome {
        let Some(table) = self.load(&TabLayout::total(), reporter).await else {
            return CommandOutcome::NoData;
        };
        match leaderboard(&table, LEADERBOARD_SIZE) {
            Ok(entries) => CommandOutcome::Leaderboard(LeaderboardResult { entries }),
            Err(err) => data_error(err, reporter),
        }
    }

    async fn total_points<R: FailureReporter + ?Sized>(
        &self,
        first_name: &str,
        reporter: &R,
    ) -> CommandOutcome {
        let Some(table) = self.load(&TabLayout::total(), reporter).await else {
            return CommandOutcome::NoData;
        };
        let Some(row) = find_by_first_name(&table, first_name) else {
            return member_not_found(first_name);
        };
        match member_result(&table, row, Period::AllTime, total_breakdown) {
            Ok(result) => CommandOutcome::MemberPoints(result),
            Err(err) => data_error(err, reporter),
        }
    }

    async fn monthly_points<R: FailureReporter + ?Sized>(
        &self,
        first_name: &str,
        month: &str,
        reporter: &R,
    ) -> CommandOutcome {
        let Some(resolved) = resolve_month(month) else {
            return CommandOutcome::NotFound(NotFoundResult {
                queried: month.to_string(),
                subject: LookupSubject::Month,
            });
        };
        let Some(table) = self.load(&TabLayout::monthly(resolved.tab), reporter).await else {
            return CommandOutcome::NoData;
        };
        let Some(row) = find_by_first_name(&table, first_name) else {
            return member_not_found(first_name);
        };
        match member_result(&table, row, month_period(resolved), monthly_breakdown) {
            Ok(result) => CommandOutcome::MemberPoints(result),
            Err(err) => data_error(err, reporter),
        }
    }

    async fn events<R: FailureReporter + ?Sized>(&self, reporter: &R) -> CommandOutcome {
        let Some(feed) = &self.events else {
            return CommandOutcome::EventsUnavailable;
        };
        match feed.fetch(Utc::now()).await {
            Ok(listing) => CommandOutcome::Events(listing),
            Err(err) => {
                report_fetch_failure(reporter, &err);
                CommandOutcome::NoData
            }
        }
    }

    async fn load<R: FailureReporter + ?Sized>(
        &self,
        layout: &TabLayout,
        reporter: &R,
    ) -> Option<SheetTable> {
        match fetch_table(&self.source, layout).await {
            Ok(table) => Some(table),
            Err(err) => {
                report_fetch_failure(reporter, &err);
                None
            }
        }
    }
}

fn month_period(month: Month) -> Period {
    Period::Month {
        key: month.key,
        title: month.title(),
    }
}

/// The breakdown is only built for members with a positive total.
fn member_result(
    table: &SheetTable,
    row: &MemberRow,
    period: Period,
    breakdown: fn(&SheetTable, &MemberRow) -> Result<Vec<BreakdownEntry>, DataError>,
) -> Result<MemberPointsResult, DataError> {
    let total = parse_total(table, row)?;
    let breakdown = if total > 0 {
        breakdown(table, row)?
    } else {
        Vec::new()
    };
    Ok(MemberPointsResult {
        name: row[NAME_COLUMN].clone(),
        total,
        period,
        breakdown,
    })
}

fn member_not_found(first_name: &str) -> CommandOutcome {
    CommandOutcome::NotFound(NotFoundResult {
        queried: first_name.to_string(),
        subject: LookupSubject::Member,
    })
}

fn data_error<R: FailureReporter + ?Sized>(err: DataError, reporter: &R) -> CommandOutcome {
    warn!("points sheet format problem: {err}");
    reporter.notify_maintainer(&format!("Points sheet data error: {err}"));
    CommandOutcome::Error(ErrorResult {
        category: FailureCategory::DataIntegrity,
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Command, Invocation, LONGEST_COOLDOWN, ParseError};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_cooldown_exceeds_retention() {
        let commands = [
            Command::Top,
            Command::Points {
                first_name: "jim".into(),
            },
            Command::MonthlyPoints {
                first_name: "jim".into(),
                month: "sep".into(),
            },
            Command::PointsLink,
            Command::Events,
        ];
        for command in commands {
            assert!(command.cooldown().0 <= LONGEST_COOLDOWN, "{}", command.name());
        }
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("!top", &[]), Ok(Command::Top));
        assert_eq!(
            Command::parse("points", &args(&["Jim"])),
            Ok(Command::Points {
                first_name: "Jim".into()
            })
        );
        assert_eq!(
            Command::parse("!monthly-points", &args(&["jim", "sep", "extra"])),
            Ok(Command::MonthlyPoints {
                first_name: "jim".into(),
                month: "sep".into()
            })
        );
    }

    #[test]
    fn missing_arguments_are_named() {
        assert_eq!(
            Command::parse("!points", &[]),
            Err(ParseError::MissingArgument {
                command: "points",
                argument: "first name"
            })
        );
        assert_eq!(
            Command::parse("!monthly-points", &args(&["jim"])),
            Err(ParseError::MissingArgument {
                command: "monthly-points",
                argument: "month"
            })
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            Command::parse("!pints", &[]),
            Err(ParseError::Unknown {
                name: "pints".into()
            })
        );
    }

    #[test]
    fn invocation_splits_message() {
        let inv = Invocation::from_message("u1", Some("g1"), "!monthly-points  jim sep");
        assert_eq!(inv.command_name, "!monthly-points");
        assert_eq!(inv.args, args(&["jim", "sep"]));
    }
}
