//! Class-partitioned stable sort for staged operations
//!
//! Writes and deletions follow opposite orders and are never ordered against
//! each other. Each class is stable-sorted on its own and written back into
//! the positions that class held before the sort, so the interleaving of
//! writes, deletions and unclassified operations is unchanged.

use std::cmp::Ordering;

/// Sort `items` class by class, keeping each class in its original slots.
///
/// `class_of` returns `None` for items that stay where they are. `compare`
/// is only called on two items of the same class and must be a total order
/// within that class. Ties keep their original order.
pub fn sort_within_slots<T, C, K, F>(items: &mut Vec<T>, class_of: K, mut compare: F)
where
    C: PartialEq,
    K: Fn(&T) -> Option<C>,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return;
    }

    let classes: Vec<Option<C>> = items.iter().map(&class_of).collect();
    let mut placement: Vec<usize> = (0..items.len()).collect();
    let mut done = vec![false; items.len()];

    for start in 0..items.len() {
        if done[start] || classes[start].is_none() {
            continue;
        }

        let slots: Vec<usize> = (start..items.len())
            .filter(|&index| classes[index] == classes[start])
            .collect();
        let mut members = slots.clone();
        members.sort_by(|&left, &right| compare(&items[left], &items[right]));

        for (&slot, &member) in slots.iter().zip(&members) {
            placement[slot] = member;
            done[slot] = true;
        }
    }

    let mut taken: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(placement.into_iter().filter_map(|index| taken[index].take()));
}
