//! Least-loaded

use super::{SelectionContext, Strategy};
use std::hash::Hash;

/// Pick the key with the shortest queue. Full queues are never candidates,
/// and ties go to the key registered first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Least;

impl<K, T> Strategy<K, T> for Least
where
    K: Eq + Hash,
{
    fn name(&self) -> &'static str {
        "least"
    }

    fn select(&self, ctx: &SelectionContext<'_, K, T>) -> Option<usize> {
        (0..ctx.key_count())
            .filter(|&index| ctx.is_candidate(index))
            .filter_map(|index| ctx.queue_len(index).map(|len| (index, len)))
            // min_by_key keeps the first of equal elements
            .min_by_key(|&(_, len)| len)
            .map(|(index, _)| index)
    }
}
