//! LINKS commands - list, add, move and remove profile links.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use clubpage_core::{EntityKind, LinkKind, OrderedCollection, SlotKey};

use super::reorder::{self, Step};
use super::{Context, HumanReadable, format_timestamp, make_request, output, resolve_id, send_request};

/// Keyword addressing the social group in `links move`.
const SOCIAL: &str = "social";

/// Arguments for the links command.
#[derive(Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    command: LinksCommand,
}

#[derive(Subcommand)]
enum LinksCommand {
    /// List your links in page order
    List,

    /// Append a link to the end of your page
    Add {
        /// Link URL
        url: String,

        /// Title shown on the page
        #[arg(long)]
        title: Option<String>,

        /// Add as a social icon for this platform (e.g. instagram)
        #[arg(long, value_name = "PLATFORM")]
        social: Option<String>,
    },

    /// Move a link, or the whole social group with `social`
    Move {
        /// Link id (or unique prefix), or `social`
        item: String,

        #[command(subcommand)]
        step: Step,
    },

    /// Delete a link
    Remove {
        /// Link id (or unique prefix)
        item: String,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Link {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub order: i32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LinkList {
    pub links: Vec<Link>,
}

impl LinkList {
    fn sorted(mut self) -> Self {
        self.links.sort_by_key(|link| link.order);
        self
    }

    /// Ids in page order and the ids of the social links.
    fn collection(&self) -> OrderedCollection {
        let order = self.links.iter().map(|link| link.id).collect();
        let social = self
            .links
            .iter()
            .filter(|link| link.kind == LinkKind::Social)
            .map(|link| link.id)
            .collect();
        OrderedCollection::new(EntityKind::Link, order).with_group(social)
    }

    fn titles(&self) -> HashMap<Uuid, String> {
        self.links
            .iter()
            .map(|link| {
                let title = match (&link.kind, &link.platform) {
                    (LinkKind::Social, Some(platform)) => format!("[{}] {}", platform, link.url),
                    _ => link.title.clone(),
                };
                (link.id, title)
            })
            .collect()
    }

    fn key(&self, item: &str) -> Result<SlotKey<Uuid>> {
        if item.eq_ignore_ascii_case(SOCIAL) {
            if !self.links.iter().any(|link| link.kind == LinkKind::Social) {
                anyhow::bail!("You have no social links");
            }
            return Ok(SlotKey::Group);
        }
        let id = resolve_id(item, self.links.iter().map(|link| link.id))?;
        Ok(SlotKey::Item(id))
    }
}

impl HumanReadable for LinkList {
    fn print_human(&self) {
        println!("{}", "Links".green().bold());
        println!("{}", "=".repeat(60));

        if self.links.is_empty() {
            println!("  {}", "(No links yet)".dimmed());
            return;
        }

        for link in &self.links {
            let marker = match link.kind {
                LinkKind::Social => "@".cyan(),
                LinkKind::Standard => " ".normal(),
            };
            println!(
                "  {:>2} {} {}  {}",
                link.order,
                marker,
                link.title.bold(),
                link.url.dimmed()
            );
            println!(
                "       {} added {}",
                link.id.to_string()[..8].dimmed(),
                format_timestamp(&link.created).dimmed()
            );
        }
    }
}

impl HumanReadable for Link {
    fn print_human(&self) {
        println!("{} {}", "Added".green().bold(), self.title.bold());
        println!("  ID:       {}", self.id);
        println!("  URL:      {}", self.url);
        println!("  Position: {}", self.order);
    }
}

#[derive(Debug, Serialize)]
struct Removed {
    id: Uuid,
}

impl HumanReadable for Removed {
    fn print_human(&self) {
        println!("{} {}", "Removed".green().bold(), self.id);
    }
}

async fn fetch(ctx: &Context) -> Result<LinkList> {
    let list: LinkList = make_request(ctx.client.get(ctx.endpoint("/links"))).await?;
    Ok(list.sorted())
}

fn create_body(url: String, title: Option<String>, social: Option<String>) -> serde_json::Value {
    match social {
        Some(platform) => json!({
            "url": url,
            "title": title,
            "kind": LinkKind::Social,
            "platform": platform,
        }),
        None => json!({
            "url": url,
            "title": title,
            "kind": LinkKind::Standard,
        }),
    }
}

/// Execute the links command.
pub async fn execute(ctx: &Context, args: LinksArgs) -> Result<()> {
    match args.command {
        LinksCommand::List => output(&fetch(ctx).await?, ctx.human),
        LinksCommand::Add { url, title, social } => {
            if social.is_none() && title.is_none() {
                anyhow::bail!("--title is required for standard links");
            }
            let body = create_body(url, title, social);
            let link: Link =
                make_request(ctx.client.post(ctx.endpoint("/links")).json(&body)).await?;
            output(&link, ctx.human)
        }
        LinksCommand::Move { item, step } => {
            let list = fetch(ctx).await?;
            let key = list.key(&item)?;
            reorder::perform(ctx, list.collection(), list.titles(), step.into_move(key)).await
        }
        LinksCommand::Remove { item } => {
            let list = fetch(ctx).await?;
            let id = resolve_id(&item, list.links.iter().map(|link| link.id))?;
            send_request(ctx.client.delete(ctx.endpoint(&format!("/links/{}", id)))).await?;
            output(&Removed { id }, ctx.human)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, kind: LinkKind, order: i32) -> Link {
        Link {
            id: Uuid::new_v4(),
            title: title.into(),
            url: format!("https://{}.example", title),
            kind,
            platform: (kind == LinkKind::Social).then(|| title.to_string()),
            order,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_collection_groups_social_links() {
        let list = LinkList {
            links: vec![
                link("club", LinkKind::Standard, 1),
                link("instagram", LinkKind::Social, 0),
                link("strava", LinkKind::Social, 2),
            ],
        }
        .sorted();

        let (instagram, club, strava) = (list.links[0].id, list.links[1].id, list.links[2].id);

        let collection = list.collection();
        assert_eq!(collection.kind(), EntityKind::Link);
        assert_eq!(collection.working(), &[instagram, strava, club]);
        assert_eq!(list.key("SOCIAL").unwrap(), SlotKey::Group);
    }

    #[test]
    fn test_social_key_needs_social_links() {
        let list = LinkList {
            links: vec![link("club", LinkKind::Standard, 0)],
        };
        assert!(list.key(SOCIAL).is_err());

        let prefix = &list.links[0].id.to_string()[..6];
        assert_eq!(list.key(prefix).unwrap(), SlotKey::Item(list.links[0].id));
    }

    #[test]
    fn test_create_body_kinds() {
        let body = create_body("https://x.example".into(), None, Some("instagram".into()));
        assert_eq!(body["kind"], "social");
        assert_eq!(body["platform"], "instagram");

        let body = create_body("https://club.example".into(), Some("Club".into()), None);
        assert_eq!(body["kind"], "standard");
        assert!(body.get("platform").is_none());
    }
}
