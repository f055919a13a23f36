//! Round-robin

use super::{SelectionContext, Strategy};
use std::hash::Hash;

/// Cycle through keys in registration order, starting just after the last
/// assigned one, and return the first whose queue is not full.
///
/// Each selection scans every key at most once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl<K, T> Strategy<K, T> for RoundRobin
where
    K: Eq + Hash,
{
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select(&self, ctx: &SelectionContext<'_, K, T>) -> Option<usize> {
        let count = ctx.key_count();
        if count == 0 {
            return None;
        }

        let start = ctx.cursor().map_or(0, |last| last + 1);
        (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&index| ctx.is_candidate(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::key_queue::KeyQueue;
    use std::collections::HashMap;

    fn queues(keys: &[&'static str], capacity: usize) -> HashMap<&'static str, KeyQueue<u32>> {
        keys.iter().map(|k| (*k, KeyQueue::new(capacity))).collect()
    }

    #[test]
    fn test_starts_at_first_key() {
        let keys = vec!["a", "b", "c"];
        let queues = queues(&keys, 1);
        let ctx = SelectionContext::new(&keys, &queues, None);
        assert_eq!(RoundRobin.select(&ctx), Some(0));
    }

    #[test]
    fn test_wraps_after_last_key() {
        let keys = vec!["a", "b", "c"];
        let queues = queues(&keys, 1);
        let ctx = SelectionContext::new(&keys, &queues, Some(2));
        assert_eq!(RoundRobin.select(&ctx), Some(0));
    }

    #[test]
    fn test_skips_full_queues() {
        let keys = vec!["a", "b", "c"];
        let mut queues = queues(&keys, 1);
        queues.get_mut("b").unwrap().push(1).unwrap();

        let ctx = SelectionContext::new(&keys, &queues, Some(0));
        assert_eq!(RoundRobin.select(&ctx), Some(2));
    }

    #[test]
    fn test_none_when_all_full_or_empty() {
        let keys = vec!["a"];
        let mut queues = queues(&keys, 1);
        queues.get_mut("a").unwrap().push(1).unwrap();
        let ctx = SelectionContext::new(&keys, &queues, None);
        assert_eq!(RoundRobin.select(&ctx), None);

        let no_keys: Vec<&str> = Vec::new();
        let empty = HashMap::new();
        let ctx = SelectionContext::<_, u32>::new(&no_keys, &empty, None);
        assert_eq!(RoundRobin.select(&ctx), None);
    }
}
