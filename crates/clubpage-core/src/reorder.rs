//! The reorder engine.
//!
//! Pure computation over in-memory sequences: given the current order of one
//! scope and a move instruction, produce the new order and the minimal set of
//! position writes. Persisting the result is the caller's job.
//!
//! Two move shapes are supported:
//!
//! - [`Move::Step`] swaps an item with its neighbour (up/down buttons).
//! - [`Move::Reposition`] removes an item and reinserts it at a target index
//!   (drag and drop). The target is clamped to the valid range.
//!
//! Positions are always the index in the resulting sequence, so every
//! successful move leaves positions dense and zero based.
//!
//! Social links are handled through [`Slot`]: the whole social group is one
//! slot of the parent list and moves as a unit, keeping its internal order.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::ReorderError;
use crate::types::PositionUpdate;

// ============================================================================
// Move instructions
// ============================================================================

/// Direction of a discrete step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// A move instruction for the item identified by `K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move<K> {
    /// Swap with the immediate neighbour in `direction`.
    Step { item: K, direction: Direction },
    /// Remove and reinsert at `target_index` of the remaining sequence.
    Reposition { item: K, target_index: usize },
}

impl<K> Move<K> {
    /// The key of the moved item.
    pub fn item(&self) -> &K {
        match self {
            Self::Step { item, .. } | Self::Reposition { item, .. } => item,
        }
    }

    /// Shorthand for `Step { direction: Up }`.
    pub fn up(item: K) -> Self {
        Self::Step {
            item,
            direction: Direction::Up,
        }
    }

    /// Shorthand for `Step { direction: Down }`.
    pub fn down(item: K) -> Self {
        Self::Step {
            item,
            direction: Direction::Down,
        }
    }

    /// Shorthand for `Reposition`.
    pub fn to(item: K, target_index: usize) -> Self {
        Self::Reposition { item, target_index }
    }

    /// Re-key the move, keeping its shape.
    pub fn map<U>(self, f: impl FnOnce(K) -> U) -> Move<U> {
        match self {
            Self::Step { item, direction } => Move::Step {
                item: f(item),
                direction,
            },
            Self::Reposition { item, target_index } => Move::Reposition {
                item: f(item),
                target_index,
            },
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// A completed reorder: the new sequence and the positions that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered<Id> {
    sequence: Vec<Id>,
    changes: Vec<PositionUpdate<Id>>,
}

impl<Id: Clone + PartialEq> Reordered<Id> {
    /// Diff `after` against `before`, where the position of every id in
    /// `before` is its index.
    ///
    /// Ids absent from `before` are always reported.
    pub fn between(before: &[Id], after: Vec<Id>) -> Self {
        let changes = after
            .iter()
            .enumerate()
            .filter(|(index, id)| before.get(*index) != Some(*id))
            .map(|(index, id)| PositionUpdate::new(id.clone(), index as u32))
            .collect();

        Self {
            sequence: after,
            changes,
        }
    }

    /// The new order.
    pub fn sequence(&self) -> &[Id] {
        &self.sequence
    }

    /// Minimal diff: only ids whose position changed, in sequence order.
    pub fn changes(&self) -> &[PositionUpdate<Id>] {
        &self.changes
    }

    /// Position for every id, for gateways that rewrite the whole list.
    pub fn full_updates(&self) -> Vec<PositionUpdate<Id>> {
        self.sequence
            .iter()
            .enumerate()
            .map(|(index, id)| PositionUpdate::new(id.clone(), index as u32))
            .collect()
    }

    /// New index of `id`, if present.
    pub fn position_of(&self, id: &Id) -> Option<usize> {
        self.sequence.iter().position(|candidate| candidate == id)
    }

    pub fn into_sequence(self) -> Vec<Id> {
        self.sequence
    }
}

/// Outcome of a move that did not hit an engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome<Id> {
    /// The order changed.
    Moved(Reordered<Id>),
    /// `Up` on the first item or `Down` on the last one.
    Boundary,
    /// The item already sits at the requested index.
    Unchanged,
}

impl<Id> ReorderOutcome<Id> {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }

    pub fn moved(&self) -> Option<&Reordered<Id>> {
        match self {
            Self::Moved(reordered) => Some(reordered),
            _ => None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

enum Target {
    Relocate { from: usize, to: usize },
    Boundary,
    Unchanged,
}

/// Resolve a move against a key list into source/destination indices.
fn resolve_target<K: PartialEq + Debug>(
    keys: &[K],
    mv: &Move<K>,
) -> Result<Target, ReorderError> {
    if keys.len() < 2 {
        return Err(ReorderError::EmptySequence);
    }

    let from = keys
        .iter()
        .position(|key| key == mv.item())
        .ok_or_else(|| ReorderError::not_found(mv.item()))?;
    let last = keys.len() - 1;

    let to = match mv {
        Move::Step {
            direction: Direction::Up,
            ..
        } => {
            if from == 0 {
                return Ok(Target::Boundary);
            }
            from - 1
        }
        Move::Step {
            direction: Direction::Down,
            ..
        } => {
            if from == last {
                return Ok(Target::Boundary);
            }
            from + 1
        }
        Move::Reposition { target_index, .. } => (*target_index).min(last),
    };

    if to == from {
        Ok(Target::Unchanged)
    } else {
        Ok(Target::Relocate { from, to })
    }
}

/// Remove the element at `from` and insert it at `to`.
fn relocate<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    out
}

/// Apply `mv` to a flat sequence of ids.
pub fn reorder<Id>(ids: &[Id], mv: &Move<Id>) -> Result<ReorderOutcome<Id>, ReorderError>
where
    Id: Clone + PartialEq + Debug,
{
    match resolve_target(ids, mv)? {
        Target::Boundary => Ok(ReorderOutcome::Boundary),
        Target::Unchanged => Ok(ReorderOutcome::Unchanged),
        Target::Relocate { from, to } => {
            let after = relocate(ids, from, to);
            Ok(ReorderOutcome::Moved(Reordered::between(ids, after)))
        }
    }
}

// ============================================================================
// Grouped slots
// ============================================================================

/// One slot of a parent list: a single item or the atomic social group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<Id> {
    Single(Id),
    Group(Vec<Id>),
}

/// Key addressing a slot in a move instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", content = "id", rename_all = "snake_case")]
pub enum SlotKey<Id> {
    Item(Id),
    Group,
}

impl<Id: Clone> Slot<Id> {
    fn key(&self) -> SlotKey<Id> {
        match self {
            Self::Single(id) => SlotKey::Item(id.clone()),
            Self::Group(_) => SlotKey::Group,
        }
    }
}

/// Build the slot list for `flat`, folding every member of `group` into one
/// slot placed where the first member appears.
///
/// Members keep the order in which they appear in `flat`. An empty or absent
/// group produces only single slots.
pub fn collapse<Id: Clone + PartialEq>(flat: &[Id], group: &[Id]) -> Vec<Slot<Id>> {
    let members: Vec<Id> = flat.iter().filter(|id| group.contains(id)).cloned().collect();
    let mut slots = Vec::with_capacity(flat.len());
    let mut placed = false;

    for id in flat {
        if group.contains(id) {
            if !placed {
                slots.push(Slot::Group(members.clone()));
                placed = true;
            }
        } else {
            slots.push(Slot::Single(id.clone()));
        }
    }

    slots
}

/// Flatten slots back into a sequence of ids.
pub fn expand<Id: Clone>(slots: &[Slot<Id>]) -> Vec<Id> {
    slots
        .iter()
        .flat_map(|slot| match slot {
            Slot::Single(id) => vec![id.clone()],
            Slot::Group(members) => members.clone(),
        })
        .collect()
}

/// Apply `mv` to a slot list. The resulting sequence and diff are flat.
///
/// Moving [`SlotKey::Group`] moves every member together; the members'
/// internal order is never altered by a parent list move.
pub fn reorder_slots<Id>(
    slots: &[Slot<Id>],
    mv: &Move<SlotKey<Id>>,
) -> Result<ReorderOutcome<Id>, ReorderError>
where
    Id: Clone + PartialEq + Debug,
{
    let keys: Vec<SlotKey<Id>> = slots.iter().map(Slot::key).collect();

    match resolve_target(&keys, mv)? {
        Target::Boundary => Ok(ReorderOutcome::Boundary),
        Target::Unchanged => Ok(ReorderOutcome::Unchanged),
        Target::Relocate { from, to } => {
            let before = expand(slots);
            let after = expand(&relocate(slots, from, to));
            Ok(ReorderOutcome::Moved(Reordered::between(&before, after)))
        }
    }
}

// ============================================================================
// Normalisation
// ============================================================================

/// Sort `(id, position)` pairs by stored position and renumber them densely.
///
/// Ties are broken by id so the result is deterministic. The diff lists the
/// ids whose stored position differs from their dense index; it is empty for
/// an already healthy scope.
pub fn normalize<Id>(items: &[(Id, u32)]) -> Reordered<Id>
where
    Id: Clone + Ord,
{
    let mut sorted = items.to_vec();
    sorted.sort_by(|(a_id, a_pos), (b_id, b_pos)| a_pos.cmp(b_pos).then_with(|| a_id.cmp(b_id)));

    let changes = sorted
        .iter()
        .enumerate()
        .filter(|(index, (_, position))| *position != *index as u32)
        .map(|(index, (id, _))| PositionUpdate::new(id.clone(), index as u32))
        .collect();

    Reordered {
        sequence: sorted.into_iter().map(|(id, _)| id).collect(),
        changes,
    }
}

/// True if `positions` is exactly `{0, 1, ..., N-1}`.
pub fn is_dense(positions: &[u32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn seq(items: &[&'static str]) -> Vec<&'static str> {
        items.to_vec()
    }

    fn moved<Id: Clone>(outcome: ReorderOutcome<Id>) -> Reordered<Id> {
        match outcome {
            ReorderOutcome::Moved(reordered) => reordered,
            _ => panic!("expected a move"),
        }
    }

    #[test]
    fn test_reposition_to_front() {
        let before = seq(&["A", "B", "C", "D"]);
        let result = moved(reorder(&before, &Move::to("C", 0)).unwrap());

        assert_eq!(result.sequence(), &["C", "A", "B", "D"]);
        assert_eq!(
            result.changes(),
            &[
                PositionUpdate::new("C", 0),
                PositionUpdate::new("A", 1),
                PositionUpdate::new("B", 2),
            ]
        );
        assert_eq!(result.full_updates().len(), 4);
        assert_eq!(result.full_updates()[3], PositionUpdate::new("D", 3));
    }

    #[test]
    fn test_step_up_on_first_is_boundary() {
        let before = seq(&["A", "B", "C"]);
        let outcome = reorder(&before, &Move::up("A")).unwrap();
        assert_eq!(outcome, ReorderOutcome::Boundary);
    }

    #[test]
    fn test_step_down_on_last_is_boundary() {
        let before = seq(&["A", "B", "C"]);
        assert_eq!(
            reorder(&before, &Move::down("C")).unwrap(),
            ReorderOutcome::Boundary
        );
    }

    #[test]
    fn test_step_down_swaps_with_neighbour() {
        let before = seq(&["A", "B", "C"]);
        let result = moved(reorder(&before, &Move::down("B")).unwrap());
        assert_eq!(result.sequence(), &["A", "C", "B"]);
        assert_eq!(
            result.changes(),
            &[PositionUpdate::new("C", 1), PositionUpdate::new("B", 2)]
        );
    }

    #[test]
    fn test_reposition_target_is_clamped() {
        let before = seq(&["A", "B", "C"]);
        let result = moved(reorder(&before, &Move::to("A", 99)).unwrap());
        assert_eq!(result.sequence(), &["B", "C", "A"]);
    }

    #[test]
    fn test_reposition_to_current_index_is_unchanged() {
        let before = seq(&["A", "B", "C"]);
        assert_eq!(
            reorder(&before, &Move::to("B", 1)).unwrap(),
            ReorderOutcome::Unchanged
        );
        // Last item clamped onto itself.
        assert_eq!(
            reorder(&before, &Move::to("C", 10)).unwrap(),
            ReorderOutcome::Unchanged
        );
    }

    #[test]
    fn test_missing_item() {
        let before = seq(&["A", "B"]);
        let err = reorder(&before, &Move::to("Z", 0)).unwrap_err();
        assert!(matches!(err, ReorderError::ItemNotFound(_)));
    }

    #[test]
    fn test_short_sequences_are_empty() {
        let empty: Vec<&str> = vec![];
        assert_eq!(
            reorder(&empty, &Move::up("A")).unwrap_err(),
            ReorderError::EmptySequence
        );
        assert_eq!(
            reorder(&seq(&["A"]), &Move::down("A")).unwrap_err(),
            ReorderError::EmptySequence
        );
    }

    #[test]
    fn test_group_moves_as_unit() {
        let flat = seq(&["L1", "fb", "tw", "L2"]);
        let slots = collapse(&flat, &["fb", "tw"]);
        assert_eq!(
            slots,
            vec![
                Slot::Single("L1"),
                Slot::Group(vec!["fb", "tw"]),
                Slot::Single("L2"),
            ]
        );

        let result = moved(reorder_slots(&slots, &Move::to(SlotKey::Group, 2)).unwrap());
        assert_eq!(result.sequence(), &["L1", "L2", "fb", "tw"]);
    }

    #[test]
    fn test_single_moves_past_group() {
        let flat = seq(&["L1", "fb", "tw", "L2"]);
        let slots = collapse(&flat, &["fb", "tw"]);

        let result = moved(reorder_slots(&slots, &Move::down(SlotKey::Item("L1"))).unwrap());
        assert_eq!(result.sequence(), &["fb", "tw", "L1", "L2"]);
        assert_eq!(result.position_of(&"L1"), Some(2));
    }

    #[test]
    fn test_group_boundary() {
        let slots = collapse(&seq(&["fb", "tw", "L1"]), &["fb", "tw"]);
        assert_eq!(
            reorder_slots(&slots, &Move::up(SlotKey::Group)).unwrap(),
            ReorderOutcome::Boundary
        );
    }

    #[test]
    fn test_group_alone_is_empty_sequence() {
        let slots = collapse(&seq(&["fb", "tw"]), &["fb", "tw"]);
        assert_eq!(
            reorder_slots(&slots, &Move::down(SlotKey::Group)).unwrap_err(),
            ReorderError::EmptySequence
        );
    }

    #[test]
    fn test_collapse_gathers_scattered_members() {
        let flat = seq(&["tw", "L1", "fb", "L2"]);
        let slots = collapse(&flat, &["fb", "tw"]);
        assert_eq!(expand(&slots), vec!["tw", "fb", "L1", "L2"]);
    }

    #[test]
    fn test_normalize_heals_gaps() {
        let items = vec![("b", 5), ("a", 2), ("c", 9)];
        let healed = normalize(&items);
        assert_eq!(healed.sequence(), &["a", "b", "c"]);
        assert_eq!(
            healed.changes(),
            &[
                PositionUpdate::new("a", 0),
                PositionUpdate::new("b", 1),
                PositionUpdate::new("c", 2),
            ]
        );
    }

    #[test]
    fn test_normalize_healthy_scope_has_no_changes() {
        let healed = normalize(&[("x", 0), ("y", 1)]);
        assert!(healed.changes().is_empty());
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[2, 0, 1]));
        assert!(is_dense(&[]));
        assert!(!is_dense(&[0, 2]));
        assert!(!is_dense(&[0, 0, 1]));
    }

    /// Random moves over random sequences keep positions dense, keep the id
    /// set, keep bystanders in relative order and never mutate on boundary.
    #[test]
    fn test_random_moves_preserve_invariants() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let len = rng.gen_range(2..12);
            let mut current: Vec<u32> = (0..len).collect();

            for _ in 0..20 {
                let item = current[rng.gen_range(0..current.len())];
                let mv = match rng.gen_range(0..3) {
                    0 => Move::up(item),
                    1 => Move::down(item),
                    _ => Move::to(item, rng.gen_range(0..len as usize + 3)),
                };

                let outcome = reorder(&current, &mv).unwrap();
                let Some(result) = outcome.moved() else {
                    if outcome == ReorderOutcome::Boundary {
                        let index = current.iter().position(|id| *id == item).unwrap();
                        assert!(index == 0 || index == current.len() - 1);
                    }
                    continue;
                };

                // Identity preservation.
                let before: HashSet<_> = current.iter().copied().collect();
                let after: HashSet<_> = result.sequence().iter().copied().collect();
                assert_eq!(before, after);

                // Density of the persisted state after applying the diff.
                let mut positions: Vec<(u32, u32)> = current
                    .iter()
                    .enumerate()
                    .map(|(index, id)| (*id, index as u32))
                    .collect();
                for change in result.changes() {
                    let entry = positions
                        .iter_mut()
                        .find(|entry| entry.0 == change.id)
                        .unwrap();
                    entry.1 = change.position;
                }
                let values: Vec<u32> = positions.iter().map(|(_, p)| *p).collect();
                assert!(is_dense(&values));
                for (id, position) in &positions {
                    assert_eq!(result.sequence()[*position as usize], *id);
                }

                // Stability of bystanders.
                let bystanders_before: Vec<u32> =
                    current.iter().copied().filter(|id| *id != item).collect();
                let bystanders_after: Vec<u32> = result
                    .sequence()
                    .iter()
                    .copied()
                    .filter(|id| *id != item)
                    .collect();
                assert_eq!(bystanders_before, bystanders_after);

                current = result.sequence().to_vec();
            }
        }
    }

    #[test]
    fn test_random_group_moves_keep_members_together() {
        let mut rng = StdRng::seed_from_u64(11);
        let group = [100u32, 101, 102];

        for _ in 0..300 {
            let singles = rng.gen_range(1..8u32);
            let mut flat: Vec<u32> = (0..singles).collect();
            let insert_at = rng.gen_range(0..=flat.len());
            for (offset, member) in group.iter().enumerate() {
                flat.insert(insert_at + offset, *member);
            }

            let slots = collapse(&flat, &group);
            let key = if rng.gen_bool(0.5) {
                SlotKey::Group
            } else {
                SlotKey::Item(rng.gen_range(0..singles))
            };
            let mv = Move::to(key, rng.gen_range(0..slots.len()));

            let Some(result) = reorder_slots(&slots, &mv).unwrap().moved().cloned() else {
                continue;
            };

            let start = result.position_of(&100).unwrap();
            assert_eq!(&result.sequence()[start..start + 3], &group);
            assert_eq!(result.sequence().len(), flat.len());
        }
    }
}
