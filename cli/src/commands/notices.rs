//! NOTICES commands - an event's notice board.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use clubpage_core::{EntityKind, OrderedCollection, SlotKey};

use super::reorder::{self, Step};
use super::{Context, HumanReadable, format_timestamp, make_request, output, resolve_id};

/// Arguments for the notices command.
#[derive(Args)]
pub struct NoticesArgs {
    /// Event id
    #[arg(long, short)]
    event: Uuid,

    #[command(subcommand)]
    command: NoticesCommand,
}

#[derive(Subcommand)]
enum NoticesCommand {
    /// List notices in board order
    List,

    /// Post a notice at the end of the board
    Add {
        title: String,

        /// Notice text
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Move a notice
    Move {
        /// Notice id (or unique prefix)
        item: String,

        #[command(subcommand)]
        step: Step,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub sequence: i32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NoticeList {
    pub notices: Vec<Notice>,
}

impl HumanReadable for NoticeList {
    fn print_human(&self) {
        println!("{}", "Notice board".green().bold());
        println!("{}", "=".repeat(60));

        if self.notices.is_empty() {
            println!("  {}", "(No notices posted)".dimmed());
            return;
        }

        for notice in &self.notices {
            println!(
                "  {:>2}  {}  {}",
                notice.sequence,
                notice.title.bold(),
                format_timestamp(&notice.created).dimmed()
            );
            if !notice.body.is_empty() {
                println!("      {}", notice.body);
            }
        }
    }
}

impl HumanReadable for Notice {
    fn print_human(&self) {
        println!("{} {}", "Posted".green().bold(), self.title.bold());
        println!("  ID:       {}", self.id);
        println!("  Position: {}", self.sequence);
    }
}

async fn fetch(ctx: &Context, event: Uuid) -> Result<NoticeList> {
    let mut list: NoticeList =
        make_request(ctx.client.get(ctx.endpoint(&format!("/events/{}/notices", event)))).await?;
    list.notices.sort_by_key(|notice| notice.sequence);
    Ok(list)
}

/// Execute the notices command.
pub async fn execute(ctx: &Context, args: NoticesArgs) -> Result<()> {
    match args.command {
        NoticesCommand::List => output(&fetch(ctx, args.event).await?, ctx.human),
        NoticesCommand::Add { title, body } => {
            let url = ctx.endpoint(&format!("/events/{}/notices", args.event));
            let notice: Notice = make_request(
                ctx.client
                    .post(&url)
                    .json(&json!({ "title": title, "body": body })),
            )
            .await?;
            output(&notice, ctx.human)
        }
        NoticesCommand::Move { item, step } => {
            let list = fetch(ctx, args.event).await?;
            let ids: Vec<Uuid> = list.notices.iter().map(|notice| notice.id).collect();
            let id = resolve_id(&item, ids.iter().copied())?;
            let titles: HashMap<Uuid, String> = list
                .notices
                .into_iter()
                .map(|notice| (notice.id, notice.title))
                .collect();

            let collection = OrderedCollection::new(EntityKind::Notice, ids);
            reorder::perform(ctx, collection, titles, step.into_move(SlotKey::Item(id))).await
        }
    }
}
