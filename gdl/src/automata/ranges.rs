//! Interval merging: overlapping inclusive ranges → maximal disjoint ranges.
//!
//! Given items that each cover an inclusive `[min, max]` key range, produce
//! the coarsest partition of the covered keys into disjoint ranges such that
//! every key in one output range is covered by exactly the same items. The
//! subset construction uses this to turn overlapping byte-range transitions
//! out of one NFA closure into non-overlapping DFA transitions.
//!
//! ```text
//!   items:   [a-m]      [g-z]
//!   output:  [a-f]{0}  [g-m]{0,1}  [n-z]{1}
//! ```

use std::collections::{BTreeMap, BTreeSet};

/// A totally ordered key type with successor and predecessor.
pub trait Discrete: Copy + Ord {
    /// The next key, or `None` at the top of the domain.
    fn succ(self) -> Option<Self>;
    /// The previous key, or `None` at the bottom of the domain.
    fn pred(self) -> Option<Self>;
}

macro_rules! impl_discrete {
    ($($t:ty),* $(,)?) => {
        $(
            impl Discrete for $t {
                fn succ(self) -> Option<Self> {
                    self.checked_add(1)
                }

                fn pred(self) -> Option<Self> {
                    self.checked_sub(1)
                }
            }
        )*
    };
}

impl_discrete!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// One output range and the items covering it, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRange<'a, K, T> {
    pub min: K,
    pub max: K,
    pub items: Vec<&'a T>,
}

/// Split the ranges of `items` into maximal disjoint ranges.
///
/// `bounds` gives each item's inclusive `(min, max)`. The result is sorted
/// ascending, and ranges no item covers are omitted. Items whose `min` is
/// greater than their `max` cover nothing.
pub fn unique_ranges<K, T, F>(items: &[T], bounds: F) -> Vec<MergedRange<'_, K, T>>
where
    K: Discrete,
    F: Fn(&T) -> (K, K),
{
    // key → (items starting here, items whose range ended just before here)
    let mut events: BTreeMap<K, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        let (min, max) = bounds(item);
        if min > max {
            continue;
        }
        events.entry(min).or_default().0.push(i);
        if let Some(after) = max.succ() {
            events.entry(after).or_default().1.push(i);
        }
    }

    let mut merged = Vec::new();
    let mut active: BTreeSet<usize> = BTreeSet::new();
    let mut previous: Option<K> = None;

    for (key, (starts, ends)) in events {
        if let Some(from) = previous {
            if !active.is_empty() {
                merged.push(MergedRange {
                    min: from,
                    max: key.pred().expect("an event key above a previous key has a predecessor"),
                    items: active.iter().map(|&i| &items[i]).collect(),
                });
            }
        }
        for i in ends {
            active.remove(&i);
        }
        active.extend(starts);
        previous = Some(key);
    }

    // Whatever is still active runs to the top of the domain.
    if let (Some(from), Some(&first)) = (previous, active.iter().next()) {
        merged.push(MergedRange {
            min: from,
            max: bounds(&items[first]).1,
            items: active.iter().map(|&i| &items[i]).collect(),
        });
    }

    merged
}
