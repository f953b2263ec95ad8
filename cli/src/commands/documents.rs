//! DOCUMENTS commands - documents attached to an event or a series.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use clubpage_core::{EntityKind, EventId, OrderedCollection, SeriesId, SlotKey};

use super::reorder::{self, Step};
use super::{Context, HumanReadable, make_request, output, resolve_id};

/// Arguments for the documents command.
#[derive(Args)]
#[command(group(ArgGroup::new("owner").required(true).args(["event", "series"])))]
pub struct DocumentsArgs {
    /// Event the documents belong to
    #[arg(long)]
    event: Option<Uuid>,

    /// Series the documents belong to
    #[arg(long)]
    series: Option<Uuid>,

    #[command(subcommand)]
    command: DocumentsCommand,
}

impl DocumentsArgs {
    fn owner(&self) -> Result<Owner> {
        match (self.event, self.series) {
            (Some(event), None) => Ok(Owner::Event(EventId(event))),
            (None, Some(series)) => Ok(Owner::Series(SeriesId(series))),
            _ => anyhow::bail!("Pass exactly one of --event or --series"),
        }
    }
}

/// What a document list hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Event(EventId),
    Series(SeriesId),
}

impl Owner {
    fn path(self) -> String {
        match self {
            Self::Event(EventId(id)) => format!("/events/{}/documents", id),
            Self::Series(SeriesId(id)) => format!("/series/{}/documents", id),
        }
    }
}

#[derive(Subcommand)]
enum DocumentsCommand {
    /// List documents in display order
    List,

    /// Attach a document at the end of the list
    Add {
        title: String,

        /// Where the file is hosted
        #[arg(long)]
        file_url: String,
    },

    /// Move a document
    Move {
        /// Document id (or unique prefix)
        item: String,

        #[command(subcommand)]
        step: Step,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub file_url: String,
    pub order: i32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
}

impl HumanReadable for DocumentList {
    fn print_human(&self) {
        println!("{}", "Documents".green().bold());
        println!("{}", "=".repeat(60));

        if self.documents.is_empty() {
            println!("  {}", "(No documents attached)".dimmed());
            return;
        }

        for document in &self.documents {
            println!(
                "  {:>2}  {}  {}",
                document.order,
                document.title.bold(),
                document.file_url.dimmed()
            );
        }
    }
}

impl HumanReadable for Document {
    fn print_human(&self) {
        println!("{} {}", "Attached".green().bold(), self.title.bold());
        println!("  ID:       {}", self.id);
        println!("  Position: {}", self.order);
    }
}

async fn fetch(ctx: &Context, owner: Owner) -> Result<DocumentList> {
    let mut list: DocumentList = make_request(ctx.client.get(ctx.endpoint(&owner.path()))).await?;
    list.documents.sort_by_key(|document| document.order);
    Ok(list)
}

/// Execute the documents command.
pub async fn execute(ctx: &Context, args: DocumentsArgs) -> Result<()> {
    let owner = args.owner()?;

    match args.command {
        DocumentsCommand::List => output(&fetch(ctx, owner).await?, ctx.human),
        DocumentsCommand::Add { title, file_url } => {
            let document: Document = make_request(
                ctx.client
                    .post(ctx.endpoint(&owner.path()))
                    .json(&json!({ "title": title, "file_url": file_url })),
            )
            .await?;
            output(&document, ctx.human)
        }
        DocumentsCommand::Move { item, step } => {
            let list = fetch(ctx, owner).await?;
            let ids: Vec<Uuid> = list.documents.iter().map(|document| document.id).collect();
            let id = resolve_id(&item, ids.iter().copied())?;
            let titles: HashMap<Uuid, String> = list
                .documents
                .into_iter()
                .map(|document| (document.id, document.title))
                .collect();

            let collection = OrderedCollection::new(EntityKind::Document, ids);
            reorder::perform(ctx, collection, titles, step.into_move(SlotKey::Item(id))).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_paths() {
        let id = Uuid::new_v4();
        assert_eq!(
            Owner::Event(EventId(id)).path(),
            format!("/events/{}/documents", id)
        );
        assert_eq!(
            Owner::Series(SeriesId(id)).path(),
            format!("/series/{}/documents", id)
        );
    }
}
