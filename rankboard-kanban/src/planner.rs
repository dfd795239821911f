//! Reorder planning
//!
//! A pure function from "these lists, move this item there" to the re-ranked lists.
//! It never touches storage and never fails: whatever it is given, it returns lists whose
//! ranks are `0..n`. Callers that care whether the input made sense (is the item really in
//! the source?) check that before planning.

/// Re-ranked lists produced by [`plan_move`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan<T> {
    /// The source list after the move
    pub source: Vec<T>,
    /// The destination list after the move, `None` when source and destination are the same list
    pub destination: Option<Vec<T>>,
}

impl<T: Clone> MovePlan<T> {
    /// True when the move stayed inside one list
    pub fn is_single_list(&self) -> bool {
        self.destination.is_none()
    }

    /// The list the moved item ended up in
    pub fn destination_list(&self) -> &[T] {
        self.destination.as_deref().unwrap_or(&self.source)
    }

    /// `(id, position)` for every item in the source list after the move
    pub fn source_ranks(&self) -> impl Iterator<Item = (T, usize)> + '_ {
        ranked(&self.source)
    }

    /// `(id, position)` for every item in the destination list, empty for single-list moves
    pub fn destination_ranks(&self) -> impl Iterator<Item = (T, usize)> + '_ {
        self.destination.iter().flat_map(|list| ranked(list))
    }
}

fn ranked<T: Clone>(list: &[T]) -> impl Iterator<Item = (T, usize)> + '_ {
    list.iter()
        .enumerate()
        .map(|(position, id)| (id.clone(), position))
}

/// Plan moving `moved` to `destination_index`
///
/// `destination` is `None` when the item is reordered inside `source`. The index is clamped
/// to the length of the destination list as it stands once the item has been taken out,
/// so anything past the end appends.
pub fn plan_move<T>(
    source: &[T],
    destination: Option<&[T]>,
    moved: &T,
    destination_index: usize,
) -> MovePlan<T>
where
    T: Clone + PartialEq,
{
    let mut source_after: Vec<T> = source.iter().filter(|id| *id != moved).cloned().collect();

    match destination {
        None => {
            let index = destination_index.min(source_after.len());
            source_after.insert(index, moved.clone());
            MovePlan {
                source: source_after,
                destination: None,
            }
        }
        Some(destination) => {
            let mut destination_after: Vec<T> = destination
                .iter()
                .filter(|id| *id != moved)
                .cloned()
                .collect();
            let index = destination_index.min(destination_after.len());
            destination_after.insert(index, moved.clone());
            MovePlan {
                source: source_after,
                destination: Some(destination_after),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn ids(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_within_list_move_to_front() {
        let plan = plan_move(&ids("ABCD"), None, &'C', 0);
        assert_eq!(plan.source, ids("CABD"));
        assert!(plan.is_single_list());

        let ranks: Vec<_> = plan.source_ranks().collect();
        assert_eq!(ranks, vec![('C', 0), ('A', 1), ('B', 2), ('D', 3)]);
    }

    #[test]
    fn test_within_list_move_down_clamps_after_removal() {
        let plan = plan_move(&ids("ABCD"), None, &'A', 3);
        assert_eq!(plan.source, ids("BCDA"));

        let plan = plan_move(&ids("ABCD"), None, &'A', 99);
        assert_eq!(plan.source, ids("BCDA"));
    }

    #[rstest]
    #[case('A', 0, "ABCD")]
    #[case('A', 1, "BACD")]
    #[case('D', 0, "DABC")]
    #[case('B', 2, "ACBD")]
    #[case('C', 1, "ACBD")]
    fn test_within_list_targets(#[case] moved: char, #[case] index: usize, #[case] expected: &str) {
        let plan = plan_move(&ids("ABCD"), None, &moved, index);
        assert_eq!(plan.source, ids(expected));
        assert_eq!(plan.source.iter().position(|c| *c == moved), Some(index));
    }

    #[test]
    fn test_cross_list_move() {
        let plan = plan_move(&ids("AB"), Some(ids("XY").as_slice()), &'A', 1);
        assert_eq!(plan.source, ids("B"));
        assert_eq!(plan.destination, Some(ids("XAY")));

        let ranks: Vec<_> = plan.destination_ranks().collect();
        assert_eq!(ranks, vec![('X', 0), ('A', 1), ('Y', 2)]);
    }

    #[test]
    fn test_cross_list_into_empty_list() {
        let plan = plan_move(&ids("A"), Some(&[][..]), &'A', 5);
        assert!(plan.source.is_empty());
        assert_eq!(plan.destination_list(), ids("A").as_slice());
    }

    #[test]
    fn test_move_to_own_slot_is_noop() {
        let plan = plan_move(&ids("ABC"), None, &'B', 1);
        assert_eq!(plan.source, ids("ABC"));
    }

    #[test]
    fn test_moved_item_already_in_destination_is_not_duplicated() {
        let plan = plan_move(&ids("AB"), Some(ids("XA").as_slice()), &'A', 0);
        assert_eq!(plan.destination, Some(ids("AX")));
    }

    proptest! {
        #[test]
        fn prop_single_list_is_a_permutation(len in 1usize..12, from in 0usize..12, to in 0usize..20) {
            let list: Vec<usize> = (0..len).collect();
            let moved = from % len;
            let plan = plan_move(&list, None, &moved, to);

            let mut sorted = plan.source.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, list);
            prop_assert_eq!(plan.source[to.min(len - 1)], moved);
        }

        #[test]
        fn prop_cross_list_conserves_items(a in 1usize..10, b in 0usize..10, from in 0usize..10, to in 0usize..15) {
            let source: Vec<usize> = (0..a).collect();
            let destination: Vec<usize> = (100..100 + b).collect();
            let moved = from % a;
            let plan = plan_move(&source, Some(destination.as_slice()), &moved, to);

            prop_assert_eq!(plan.source.len(), a - 1);
            prop_assert_eq!(plan.destination_list().len(), b + 1);
            prop_assert!(!plan.source.contains(&moved));
            prop_assert_eq!(plan.destination_list()[to.min(b)], moved);
        }

        #[test]
        fn prop_replanning_is_idempotent(len in 1usize..10, from in 0usize..10, to in 0usize..10) {
            let list: Vec<usize> = (0..len).collect();
            let moved = from % len;
            let once = plan_move(&list, None, &moved, to);
            let twice = plan_move(&once.source, None, &moved, to);
            prop_assert_eq!(once, twice);
        }
    }
}
