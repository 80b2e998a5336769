use std::fmt::Write as _;

use crate::commands::{
    COMMAND_NAMES, CommandOutcome, LookupSubject, MemberPointsResult, NotFoundResult, Period,
};
use crate::events::{EventListing, PromoEvent};
use crate::points::{LEADERBOARD_SIZE, LeaderboardEntry};

const SHEET_FOOTER: &str = "Data pulled from points tracker. Access it via !points-link.";

/// Plain-text reply for an outcome; `None` when nothing should be sent.
pub fn render(outcome: &CommandOutcome, mention: &str) -> Option<String> {
    let text = match outcome {
        CommandOutcome::Leaderboard(result) => render_leaderboard(&result.entries),
        CommandOutcome::MemberPoints(result) => render_member(result, mention),
        CommandOutcome::NotFound(result) => render_not_found(result, mention),
        CommandOutcome::Error(result) => format!(
            "Sorry {mention}, the points tracker returned data we could not read ({}). \
             The bot developers have been notified.",
            result.category
        ),
        CommandOutcome::PointsLink { url } => format!(
            "**Member Points Link**\nHello {mention}!\n\nView the current members points tally here:\n{url}\n\n\
             This spreadsheet is maintained by the executive team. Message them if you have any questions!"
        ),
        CommandOutcome::Events(listing) => render_events(listing),
        CommandOutcome::EventsUnavailable => {
            "The events feed is not configured right now.".to_string()
        }
        CommandOutcome::Usage { command, argument } => format!(
            "{mention}, we could not find a {argument} to search for in your !{command} command. \
             Please specify a {argument} by typing it after !{command}.\n**Example:** {}",
            usage_example(command)
        ),
        CommandOutcome::UnknownCommand { .. } => unknown_command_hint(mention),
        CommandOutcome::CoolingDown { retry_after_secs } => format!(
            "{mention}, you are on cooldown. Try again in {retry_after_secs}s."
        ),
        CommandOutcome::NoData => return None,
    };
    Some(text)
}

pub fn unknown_command_hint(mention: &str) -> String {
    let listed = COMMAND_NAMES
        .iter()
        .map(|name| format!("!{name}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Hi {mention}. A command could not be recognized in the last message you sent. \
         Check for any misspelling. Supported commands: {listed}."
    )
}

pub fn welcome_message(mention: &str) -> String {
    format!(
        ":tada: **Welcome to the server, {mention}!** :tada:\n\n\
         Thanks for joining us! On our server, you can get a chance to connect with other members and the executive team!\n\n\
         :wave: Introduce yourself in the **#introductions** channel and say hi!\n\n\
         :grey_question:**Need help using the server?** Helpful tips are in the **#server-rules** channel.\n\n\
         **We hope you enjoy your stay!**"
    )
}

fn usage_example(command: &str) -> &'static str {
    match command {
        "monthly-points" => "!monthly-points jim sep *OR* !monthly-points jim september",
        _ => "!points jim",
    }
}

fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut out = format!("**Member Points Leaderboard**\n__Top {LEADERBOARD_SIZE} Point Totals__\n");
    let width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(6).max(6);
    let _ = writeln!(out, "{:<3} {:<width$} {:>6}", "#", "Person", "Points");
    for (idx, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{:<3} {:<width$} {:>6}", idx + 1, entry.name, entry.points);
    }
    out.push_str(SHEET_FOOTER);
    out
}

fn render_member(result: &MemberPointsResult, mention: &str) -> String {
    let mut out = format!(
        "**Member Points**\nHello {mention}!\n\n**{}** currently has **{}** points!",
        result.name, result.total
    );
    if result.total > 0 {
        match &result.period {
            Period::AllTime => {
                out.push_str("\n\n**__Points Breakdown By Month:__**\n");
                for entry in &result.breakdown {
                    let _ = writeln!(out, "{}: {}", entry.label, entry.amount);
                }
            }
            Period::Month { title, .. } => {
                let _ = write!(out, "\n\n**__Points Breakdown for {title}:__**\n");
                for entry in &result.breakdown {
                    let _ = writeln!(out, "{:+} {}", entry.amount, entry.label);
                }
            }
        }
    } else {
        out.push('\n');
    }
    out.push_str(SHEET_FOOTER);
    out
}

fn render_not_found(result: &NotFoundResult, mention: &str) -> String {
    match result.subject {
        LookupSubject::Member => format!(
            "Sorry {mention}, we could not find a points entry for a member with name **{}**. \
             Please check for any spelling errors. *If the error persists, please contact one of our Bot Developers*.",
            result.queried
        ),
        LookupSubject::Month => format!(
            "Sorry, we tried to search for a month matching with **{}** but could not find one. \
             Check for misspelling.",
            result.queried
        ),
    }
}

fn render_events(listing: &EventListing) -> String {
    let mut out = String::from("**Upcoming and Recent Events**\n");
    if listing.is_empty() {
        out.push_str("No events to show right now.\n");
    }
    if !listing.upcoming.is_empty() {
        out.push_str("\n__UPCOMING EVENTS__\n");
        push_events(&mut out, &listing.upcoming);
    }
    if !listing.recent.is_empty() {
        out.push_str("\n__RECENT AND ONGOING EVENTS__\n");
        push_events(&mut out, &listing.recent);
    }
    out.push_str("\nHave any questions? Message our Executive Team!");
    out
}

fn push_events(out: &mut String, events: &[PromoEvent]) {
    for event in events {
        let _ = writeln!(
            out,
            "**{} ({})**\n{}",
            event.name,
            event.event_date.format("%b %d, %Y"),
            event.description
        );
    }
}
