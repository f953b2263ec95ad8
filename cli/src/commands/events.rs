//! EVENTS and SERIES commands - create and list the scopes that notices and
//! documents hang off.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{Context, HumanReadable, format_timestamp, make_request, output};

/// Arguments for the events command.
#[derive(Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    command: EventsCommand,
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events you own
    List,

    /// Create an event
    Create {
        title: String,

        /// Start time, RFC 3339 (e.g. 2026-06-14T09:30:00Z)
        #[arg(long)]
        starts_at: DateTime<Utc>,

        #[arg(long)]
        location: Option<String>,

        /// Series the event belongs to
        #[arg(long)]
        series: Option<Uuid>,
    },
}

/// Arguments for the series command.
#[derive(Args)]
pub struct SeriesArgs {
    #[command(subcommand)]
    command: SeriesCommand,
}

#[derive(Subcommand)]
enum SeriesCommand {
    /// List series you own
    List,

    /// Create a series
    Create { name: String },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<Uuid>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Series {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SeriesList {
    pub series: Vec<Series>,
}

impl HumanReadable for Event {
    fn print_human(&self) {
        println!("{} {}", self.title.bold(), self.id.to_string().dimmed());
        println!("  Starts:   {}", format_timestamp(&self.starts_at));
        if let Some(ref location) = self.location {
            println!("  Location: {}", location);
        }
        if let Some(series) = self.series_id {
            println!("  Series:   {}", series);
        }
    }
}

impl HumanReadable for EventList {
    fn print_human(&self) {
        println!("{}", "Events".green().bold());
        println!("{}", "=".repeat(60));

        if self.events.is_empty() {
            println!("  {}", "(No events)".dimmed());
            return;
        }
        for event in &self.events {
            event.print_human();
        }
    }
}

impl HumanReadable for Series {
    fn print_human(&self) {
        println!("{} {}", self.name.bold(), self.id.to_string().dimmed());
    }
}

impl HumanReadable for SeriesList {
    fn print_human(&self) {
        println!("{}", "Series".green().bold());
        println!("{}", "=".repeat(60));

        if self.series.is_empty() {
            println!("  {}", "(No series)".dimmed());
            return;
        }
        for series in &self.series {
            series.print_human();
        }
    }
}

/// Execute the events command.
pub async fn execute(ctx: &Context, args: EventsArgs) -> Result<()> {
    match args.command {
        EventsCommand::List => {
            let list: EventList = make_request(ctx.client.get(ctx.endpoint("/events"))).await?;
            output(&list, ctx.human)
        }
        EventsCommand::Create {
            title,
            starts_at,
            location,
            series,
        } => {
            let body = json!({
                "title": title,
                "starts_at": starts_at,
                "location": location,
                "series_id": series,
            });
            let event: Event =
                make_request(ctx.client.post(ctx.endpoint("/events")).json(&body)).await?;
            output(&event, ctx.human)
        }
    }
}

/// Execute the series command.
pub async fn execute_series(ctx: &Context, args: SeriesArgs) -> Result<()> {
    match args.command {
        SeriesCommand::List => {
            let list: SeriesList = make_request(ctx.client.get(ctx.endpoint("/series"))).await?;
            output(&list, ctx.human)
        }
        SeriesCommand::Create { name } => {
            let series: Series = make_request(
                ctx.client
                    .post(ctx.endpoint("/series"))
                    .json(&json!({ "name": name })),
            )
            .await?;
            output(&series, ctx.human)
        }
    }
}
