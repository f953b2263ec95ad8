//! Shared `move` plumbing: the step arguments and the gesture run.

use std::collections::HashMap;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use clubpage_core::{CollectionView, GestureOutcome, Move, OrderedCollection, SlotKey};

use super::gateway::{HttpGateway, TerminalNotifier};
use super::{Context, HumanReadable, output};

/// Where to move an item.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Step {
    /// One place towards the top
    Up,
    /// One place towards the bottom
    Down,
    /// To a zero-based index (past the end means last)
    To { index: usize },
}

impl Step {
    pub fn into_move<K>(self, item: K) -> Move<K> {
        match self {
            Self::Up => Move::up(item),
            Self::Down => Move::down(item),
            Self::To { index } => Move::to(item, index),
        }
    }
}

/// One line of the resulting order.
#[derive(Debug, Serialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub title: String,
}

/// Result of a `move` command.
#[derive(Debug, Serialize)]
pub struct MoveReport {
    /// committed, boundary, unchanged, reverted or ignored.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Order shown after the gesture.
    pub order: Vec<OrderLine>,
}

impl HumanReadable for MoveReport {
    fn print_human(&self) {
        let label = match self.outcome {
            "committed" => "Saved".green().bold(),
            "reverted" => "Not saved".red().bold(),
            _ => "No change".yellow().bold(),
        };
        match &self.error {
            Some(error) => println!("{} ({})", label, error),
            None => println!("{}", label),
        }

        for (index, line) in self.order.iter().enumerate() {
            println!("  {:>2}. {}", index, line.title);
        }
    }
}

fn report(outcome: &GestureOutcome, order: &[Uuid], titles: &HashMap<Uuid, String>) -> MoveReport {
    let (name, error) = match outcome {
        GestureOutcome::Committed { .. } => ("committed", None),
        GestureOutcome::Boundary => ("boundary", None),
        GestureOutcome::Unchanged => ("unchanged", None),
        GestureOutcome::Reverted { error } => ("reverted", Some(error.to_string())),
        GestureOutcome::Ignored(error) => ("ignored", Some(error.to_string())),
    };

    MoveReport {
        outcome: name,
        error,
        order: order
            .iter()
            .map(|id| OrderLine {
                id: *id,
                title: titles.get(id).cloned().unwrap_or_else(|| id.to_string()),
            })
            .collect(),
    }
}

/// Run one gesture against `collection` and print the result.
///
/// A reverted gesture is an error for the process exit code; the notifier has
/// already told the user why.
pub async fn perform(
    ctx: &Context,
    collection: OrderedCollection,
    titles: HashMap<Uuid, String>,
    mv: Move<SlotKey<Uuid>>,
) -> Result<()> {
    let mut view = CollectionView::new(collection, HttpGateway::new(ctx.clone()), TerminalNotifier);
    let outcome = view.perform(mv).await;

    let shown = report(&outcome, view.collection().working(), &titles);
    output(&shown, ctx.human)?;

    if let GestureOutcome::Reverted { .. } = outcome {
        anyhow::bail!("the new order was not saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_core::{CommitError, Direction};

    #[test]
    fn test_step_into_move() {
        let id = Uuid::new_v4();
        assert_eq!(
            Step::Up.into_move(id),
            Move::Step {
                item: id,
                direction: Direction::Up
            }
        );
        assert_eq!(
            Step::To { index: 4 }.into_move(SlotKey::<Uuid>::Group),
            Move::Reposition {
                item: SlotKey::Group,
                target_index: 4
            }
        );
    }

    #[test]
    fn test_report_uses_titles() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let titles = HashMap::from([(a, "Results".to_string())]);

        let shown = report(
            &GestureOutcome::Reverted {
                error: CommitError::Transient("timeout".into()),
            },
            &[a, b],
            &titles,
        );
        assert_eq!(shown.outcome, "reverted");
        assert_eq!(shown.order[0].title, "Results");
        assert_eq!(shown.order[1].title, b.to_string());
        assert!(shown.error.unwrap().contains("timeout"));
    }
}
